use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Duration written as `1h`, `30m`, `1d` or `1h15m30s`. A bare number is
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        _ => None,
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err("Duration must include a number".to_string());
        }

        let overflow = || format!("Duration too large: {}", s);
        let mut total: u64 = 0;
        let mut rest = compact.as_str();

        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                let found = rest.chars().next().unwrap_or_default();
                return Err(format!("Expected a number before '{}'", found));
            }
            let amount: u64 = rest[..digits].parse().map_err(|_| overflow())?;
            rest = &rest[digits..];

            // A trailing bare number counts as seconds.
            let scale = match rest.chars().next() {
                None => 1,
                Some(unit) => {
                    rest = &rest[unit.len_utf8()..];
                    unit_seconds(unit).ok_or_else(|| format!("Invalid duration unit: {}", unit))?
                }
            };

            total = amount
                .checked_mul(scale)
                .and_then(|seconds| total.checked_add(seconds))
                .ok_or_else(overflow)?;
        }

        if total == 0 {
            return Err("Duration must be positive".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!("1h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3600));
        assert_eq!("30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(1800));
        assert_eq!("1d".parse::<HumanDuration>().unwrap().0, Duration::from_secs(86400));
        assert_eq!("1h15m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4530));
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("h".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
        assert!("0s".parse::<HumanDuration>().is_err());
        assert!("h5".parse::<HumanDuration>().is_err());
        assert!("é5s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!("999999999999999999d".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615s1s".parse::<HumanDuration>().is_err());
        assert!("99999999999999999999999".parse::<HumanDuration>().is_err());
        assert_eq!(
            "1 h 30 m".parse::<HumanDuration>().unwrap().0,
            Duration::from_secs(5400)
        );
    }
}
