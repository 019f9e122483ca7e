use serde::{Deserialize, Serialize};

use legitest_runner::TestOutcome;

pub const MSG_CODE_WITHOUT_TESTS: &str = "Code changes without unittests";
pub const MSG_NO_TEST_CHANGE: &str = "No change to unittests";
pub const MSG_COULD_NOT_PASS: &str = "Could not pass unittests";
pub const MSG_TESTS_DO_NOT_BREAK: &str = "Unittests do not break any codes";
pub const MSG_LEGITIMATE: &str = "Legitimate unittests";

/// Judgement on one commit's test changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Verdict {
    /// Production code changed, tests did not; no tests were run
    CodeChangeWithoutTests,
    /// Nothing for the differential protocol to measure
    NoUnitTestChange,
    /// The suite failed against the commit itself
    CouldNotPass {
        /// The suite also passed with production code reverted
        tests_do_not_break_anything: bool,
    },
    /// The suite still passed with production code reverted
    TestsDoNotBreakAnything,
    Legitimate,
}

impl Verdict {
    /// Combine the two differential flags
    pub fn from_flags(could_not_pass: bool, tests_do_not_break_anything: bool) -> Self {
        match (could_not_pass, tests_do_not_break_anything) {
            (true, both) => Verdict::CouldNotPass {
                tests_do_not_break_anything: both,
            },
            (false, true) => Verdict::TestsDoNotBreakAnything,
            (false, false) => Verdict::Legitimate,
        }
    }

    /// The post-change run must pass and the pre-change run must fail
    pub fn from_phases(post_change: TestOutcome, pre_change: TestOutcome) -> Self {
        Self::from_flags(!post_change.passed(), pre_change.passed())
    }

    /// Report messages, one per finding
    pub fn messages(&self) -> Vec<&'static str> {
        match self {
            Verdict::CodeChangeWithoutTests => vec![MSG_CODE_WITHOUT_TESTS],
            Verdict::NoUnitTestChange => vec![MSG_NO_TEST_CHANGE],
            Verdict::CouldNotPass {
                tests_do_not_break_anything: true,
            } => vec![MSG_COULD_NOT_PASS, MSG_TESTS_DO_NOT_BREAK],
            Verdict::CouldNotPass {
                tests_do_not_break_anything: false,
            } => vec![MSG_COULD_NOT_PASS],
            Verdict::TestsDoNotBreakAnything => vec![MSG_TESTS_DO_NOT_BREAK],
            Verdict::Legitimate => vec![MSG_LEGITIMATE],
        }
    }

    /// Whether this verdict fails the run
    pub fn is_failure(&self) -> bool {
        !matches!(self, Verdict::Legitimate | Verdict::NoUnitTestChange)
    }

    pub fn short_description(&self) -> String {
        self.messages().join("; ")
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.short_description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legitest_runner::TestOutcome::{Failed, Passed};

    #[test]
    fn test_expected_phases_are_legitimate() {
        assert_eq!(Verdict::from_phases(Passed, Failed), Verdict::Legitimate);
    }

    #[test]
    fn test_vacuous_tests() {
        assert_eq!(
            Verdict::from_phases(Passed, Passed),
            Verdict::TestsDoNotBreakAnything
        );
    }

    #[test]
    fn test_flags_are_reported_separately() {
        let only_broken = Verdict::from_phases(Failed, Failed);
        assert_eq!(only_broken.messages(), vec![MSG_COULD_NOT_PASS]);

        let both = Verdict::from_phases(Failed, Passed);
        assert_eq!(
            both.messages(),
            vec![MSG_COULD_NOT_PASS, MSG_TESTS_DO_NOT_BREAK]
        );
    }

    #[test]
    fn test_failure_policy() {
        assert!(!Verdict::Legitimate.is_failure());
        assert!(!Verdict::NoUnitTestChange.is_failure());
        assert!(Verdict::CodeChangeWithoutTests.is_failure());
        assert!(Verdict::TestsDoNotBreakAnything.is_failure());
        assert!(Verdict::CouldNotPass {
            tests_do_not_break_anything: false
        }
        .is_failure());
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(Verdict::CouldNotPass {
            tests_do_not_break_anything: true,
        })
        .unwrap();
        assert_eq!(json["type"], "could_not_pass");
        assert_eq!(json["tests_do_not_break_anything"], true);

        let json = serde_json::to_value(Verdict::Legitimate).unwrap();
        assert_eq!(json["type"], "legitimate");
    }
}
