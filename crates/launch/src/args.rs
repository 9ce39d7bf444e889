//! Rewriting the command line for child job processes.

use std::collections::HashMap;

/// Flags that configure backend dispatch and must not reach child
/// processes, mapped to whether each takes a value.
#[derive(Debug, Clone, Default)]
pub struct StripFlags {
    flags: HashMap<String, bool>,
}

impl StripFlags {
    /// Creates an empty strip list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a boolean flag (no value follows it).
    pub fn flag(mut self, flag: &str) -> Self {
        self.insert(flag, false);
        self
    }

    /// Adds a flag that takes a value.
    pub fn flag_with_value(mut self, flag: &str) -> Self {
        self.insert(flag, true);
        self
    }

    /// Records a flag, with whether a value follows it.
    pub fn insert(&mut self, flag: &str, has_argument: bool) {
        self.flags.insert(flag.to_string(), has_argument);
    }

    fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(flag, has)| (flag.as_str(), *has))
    }
}

/// Passes the parent's arguments on to a child job process, minus the
/// flags that configure dispatch, plus the flags selecting this
/// particular job.
///
/// Job-selection flags already present in the parent's arguments are
/// removed first so the child sees only its own selection. Both the
/// `--flag value` and `--flag=value` spellings are recognized.
pub fn setup_args_for_job(
    strip: &StripFlags,
    job_args: &[String],
    arg_list: &[String],
) -> Vec<String> {
    let mut to_remove: HashMap<String, bool> = strip.iter().map(|(f, h)| (f.to_string(), h)).collect();
    for job_flag in job_args.iter().filter(|arg| arg.starts_with("--")) {
        to_remove.insert(job_flag.clone(), true);
    }

    let mut args: Vec<String> = arg_list.to_vec();
    for (flag, has_argument) in &to_remove {
        let joined = format!("{}=", flag);
        let mut index = 0;
        while index < args.len() {
            if args[index] == *flag || args[index].starts_with(&joined) {
                let width = if args[index].contains('=') || !has_argument {
                    1
                } else {
                    2
                };
                args.drain(index..(index + width).min(args.len()));
            } else {
                index += 1;
            }
        }
    }

    args.extend(job_args.iter().cloned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    /// Arguments handed to a child selected with `--job-id 7`.
    #[test]
    fn test_args_for_int_job() {
        let cases: &[(&[(&str, bool)], &[&str], &[&str])] = &[
            (&[], &[], &["--job-id", "7"]),
            (&[], &["--job-id", "9"], &["--job-id", "7"]),
            (&[], &["--howdy"], &["--howdy", "--job-id", "7"]),
            (&[], &["--howdy", "4"], &["--howdy", "4", "--job-id", "7"]),
            (
                &[],
                &["--job-id", "9", "--howdy"],
                &["--howdy", "--job-id", "7"],
            ),
            (
                &[("--grid-engine", false)],
                &["--grid-engine"],
                &["--job-id", "7"],
            ),
            (
                &[("--queue", true)],
                &["--queue", "all.q"],
                &["--job-id", "7"],
            ),
            (&[("--queue", true)], &[], &["--job-id", "7"]),
            (&[("--queue", true)], &["-v"], &["-v", "--job-id", "7"]),
        ];
        for (to_remove, arg_list, expected) in cases {
            let mut strip = StripFlags::new();
            for (flag, has_argument) in *to_remove {
                strip.insert(flag, *has_argument);
            }
            let result =
                setup_args_for_job(&strip, &strings(&["--job-id", "7"]), &strings(arg_list));
            assert_eq!(
                result,
                strings(expected),
                "strip {:?}, args {:?}",
                to_remove,
                arg_list
            );
        }
    }

    #[test]
    fn test_equals_spelling_is_removed() {
        let strip = StripFlags::new().flag_with_value("--memory-limit");
        let result = setup_args_for_job(
            &strip,
            &strings(&["--job-id", "7"]),
            &strings(&["--memory-limit=16", "--howdy"]),
        );
        assert_eq!(result, strings(&["--howdy", "--job-id", "7"]));
    }

    #[test]
    fn test_job_args_without_flags_pass_through() {
        let result = setup_args_for_job(&StripFlags::new(), &strings(&[]), &strings(&["-v"]));
        assert_eq!(result, strings(&["-v"]));
    }
}
