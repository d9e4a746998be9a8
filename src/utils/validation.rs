use crate::utils::error::{BenchError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list(field_name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "[]".to_string(),
            reason: "List needs at least one entry".to_string(),
        });
    }
    for value in values {
        validate_non_empty_string(field_name, value)?;
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(BenchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("server.working_dir", "./server").is_ok());
        assert!(validate_path("server.working_dir", "").is_err());
        assert!(validate_path("server.working_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("run.runs", 3, 1).is_ok());
        assert!(validate_positive_number("run.runs", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("run.startup_timeout_seconds", 120, 1, 3600).is_ok());
        assert!(validate_range("run.startup_timeout_seconds", 0, 1, 3600).is_err());
        assert!(validate_range("run.startup_timeout_seconds", 7200, 1, 3600).is_err());
    }

    #[test]
    fn test_validate_non_empty_list() {
        let keys = vec!["chunk-ticking".to_string(), "enabled".to_string()];
        assert!(validate_non_empty_list("flags.keys", &keys).is_ok());
        assert!(validate_non_empty_list("flags.keys", &[]).is_err());
        assert!(validate_non_empty_list("flags.keys", &["  ".to_string()]).is_err());
    }
}
