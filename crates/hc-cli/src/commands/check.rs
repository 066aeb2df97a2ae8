//! Check command: validates recurrence settings of every service.

use anyhow::{Result, bail};
use hc_core::ServiceDefinition;

pub fn run<W: std::io::Write>(writer: &mut W, services: &[ServiceDefinition]) -> Result<()> {
    let mut invalid = 0usize;

    for service in services {
        match service.validate() {
            Ok(()) => writeln!(writer, "ok       {}", service.id)?,
            Err(err) => {
                invalid += 1;
                writeln!(writer, "invalid  {}: {err}", service.id)?;
            }
        }
    }

    if invalid > 0 {
        bail!("{invalid} of {} service definitions are invalid", services.len());
    }

    writeln!(writer, "{} service definitions checked", services.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_invalid_definition() {
        let services: Vec<ServiceDefinition> = serde_json::from_str(
            r#"[
                {"id": "good", "start": "2024-01-10T09:00:00", "duration_minutes": 60},
                {"id": "open-ended", "start": "2024-01-10T09:00:00", "duration_minutes": 60,
                 "repeat_mode": "weekdays"},
                {"id": "no-days", "start": "2024-01-10T09:00:00", "duration_minutes": 60,
                 "repeat_mode": "custom", "repeat_until": "2024-02-01"}
            ]"#,
        )
        .unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &services).unwrap_err();
        let output = String::from_utf8(output).unwrap();

        assert_eq!(err.to_string(), "2 of 3 service definitions are invalid");
        assert_eq!(
            output,
            "ok       good\n\
             invalid  open-ended: repeating services (weekdays) need an end date\n\
             invalid  no-days: custom repetition needs at least one day of the week\n"
        );
    }

    #[test]
    fn all_valid() {
        let mut output = Vec::new();
        run(&mut output, &[]).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "0 service definitions checked\n");
    }
}
