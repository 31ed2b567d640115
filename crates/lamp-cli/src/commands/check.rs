use super::{exit_code_for, json_pretty, status_cell, EXIT_SUCCESS};
use lamp_core::{CoreError, Engine};
use lamp_schema::HostClass;

pub fn run(engine: &Engine, host_class: Option<HostClass>, json: bool) -> Result<u8, String> {
    let results = engine.plan_all(host_class);

    let mut exit = EXIT_SUCCESS;
    let mut rows = Vec::with_capacity(results.len());
    for (id, result) in &results {
        let (status, detail, digest) = match result {
            Ok(plan) => ("ok", None, Some(plan.digest().short_digest)),
            Err(e) => {
                let msg = e.to_string();
                if exit == EXIT_SUCCESS {
                    exit = exit_code_for(&msg);
                }
                let status = if matches!(e, CoreError::Incompatible(_)) {
                    "incompatible"
                } else {
                    "error"
                };
                (status, Some(msg), None)
            }
        };
        rows.push((id, status, detail, digest));
    }

    if json {
        let payload: Vec<_> = rows
            .iter()
            .map(|(id, status, detail, digest)| {
                serde_json::json!({
                    "system": id,
                    "status": status,
                    "digest": digest,
                    "error": detail,
                })
            })
            .collect();
        println!("{}", json_pretty(&payload)?);
    } else {
        for (id, status, detail, digest) in &rows {
            let tail = match (detail, digest) {
                (Some(msg), _) => msg.clone(),
                (None, Some(d)) => d.to_string(),
                (None, None) => String::new(),
            };
            println!("{:<14} {} {tail}", id, status_cell(status, 14));
        }
    }
    Ok(exit)
}
