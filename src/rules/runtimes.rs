//! Lambda runtimes with a published end-of-life date.

use chrono::NaiveDate;

/// A deprecated Lambda runtime and the runtime to move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprecatedRuntime {
    pub name: &'static str,
    eol: (i32, u32, u32),
    pub successor: &'static str,
}

impl DeprecatedRuntime {
    const fn new(name: &'static str, eol: (i32, u32, u32), successor: &'static str) -> Self {
        Self {
            name,
            eol,
            successor,
        }
    }

    pub fn eol(&self) -> Option<NaiveDate> {
        let (year, month, day) = self.eol;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

pub const DEPRECATED_RUNTIMES: &[DeprecatedRuntime] = &[
    DeprecatedRuntime::new("nodejs", (2016, 10, 31), "nodejs20.x"),
    DeprecatedRuntime::new("nodejs4.3", (2020, 3, 5), "nodejs20.x"),
    DeprecatedRuntime::new("nodejs4.3-edge", (2020, 4, 30), "nodejs20.x"),
    DeprecatedRuntime::new("nodejs6.10", (2019, 8, 12), "nodejs20.x"),
    DeprecatedRuntime::new("nodejs8.10", (2020, 3, 6), "nodejs20.x"),
    DeprecatedRuntime::new("nodejs10.x", (2021, 7, 30), "nodejs20.x"),
    DeprecatedRuntime::new("nodejs12.x", (2023, 3, 31), "nodejs20.x"),
    DeprecatedRuntime::new("nodejs14.x", (2023, 12, 4), "nodejs20.x"),
    DeprecatedRuntime::new("nodejs16.x", (2024, 6, 12), "nodejs20.x"),
    DeprecatedRuntime::new("nodejs18.x", (2025, 9, 1), "nodejs22.x"),
    DeprecatedRuntime::new("nodejs20.x", (2026, 4, 30), "nodejs22.x"),
    DeprecatedRuntime::new("python2.7", (2021, 7, 15), "python3.12"),
    DeprecatedRuntime::new("python3.6", (2022, 7, 18), "python3.12"),
    DeprecatedRuntime::new("python3.7", (2023, 12, 4), "python3.12"),
    DeprecatedRuntime::new("python3.8", (2024, 10, 14), "python3.12"),
    DeprecatedRuntime::new("python3.9", (2025, 12, 15), "python3.13"),
    DeprecatedRuntime::new("java8", (2024, 1, 8), "java21"),
    DeprecatedRuntime::new("go1.x", (2024, 1, 8), "provided.al2023"),
    DeprecatedRuntime::new("provided", (2024, 1, 8), "provided.al2023"),
    DeprecatedRuntime::new("ruby2.5", (2021, 7, 30), "ruby3.3"),
    DeprecatedRuntime::new("ruby2.7", (2023, 12, 7), "ruby3.3"),
    DeprecatedRuntime::new("ruby3.2", (2026, 3, 31), "ruby3.3"),
    DeprecatedRuntime::new("dotnetcore1.0", (2019, 7, 30), "dotnet8"),
    DeprecatedRuntime::new("dotnetcore2.0", (2019, 5, 30), "dotnet8"),
    DeprecatedRuntime::new("dotnetcore2.1", (2022, 1, 5), "dotnet8"),
    DeprecatedRuntime::new("dotnetcore3.1", (2023, 4, 3), "dotnet8"),
    DeprecatedRuntime::new("dotnet5.0", (2022, 5, 10), "dotnet8"),
    DeprecatedRuntime::new("dotnet6", (2024, 12, 20), "dotnet8"),
    DeprecatedRuntime::new("dotnet7", (2024, 5, 14), "dotnet8"),
];

/// Look up a runtime identifier.
pub fn lookup(runtime: &str) -> Option<&'static DeprecatedRuntime> {
    DEPRECATED_RUNTIMES.iter().find(|r| r.name == runtime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_dates_valid() {
        for runtime in DEPRECATED_RUNTIMES {
            assert!(runtime.eol().is_some(), "{} has an invalid date", runtime.name);
        }
    }

    #[test]
    fn test_names_unique() {
        let mut names: Vec<&str> = DEPRECATED_RUNTIMES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DEPRECATED_RUNTIMES.len());
    }

    #[test]
    fn test_lookup() {
        let runtime = lookup("python3.8").unwrap();
        assert_eq!(runtime.eol(), NaiveDate::from_ymd_opt(2024, 10, 14));
        assert_eq!(runtime.successor, "python3.12");
        assert!(lookup("python3.12").is_none());
    }
}
