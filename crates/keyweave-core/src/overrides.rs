use crate::error::{KeyweaveError, KwResult};
use crate::keycodes::Key;
use keyweave_protocol::{HardwareCode, KeyOverride};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Reads `hardware_code,key` rows. The key is either a logical code or a
/// key name such as `PAD ENTER`.
pub fn load_overrides<P: AsRef<Path>>(path: P) -> KwResult<Vec<KeyOverride>> {
    let file = File::open(path)?;
    parse_overrides(file)
}

pub fn parse_overrides<R: Read>(reader: R) -> KwResult<Vec<KeyOverride>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut overrides = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() < 2 {
            continue;
        }
        let code: HardwareCode = record[0].parse().map_err(|_| {
            KeyweaveError::Config(format!("bad hardware code '{}' in override file", &record[0]))
        })?;
        let key = match record[1].parse::<u16>() {
            Ok(n) => n,
            Err(_) => match Key::from_label(&record[1]) {
                Some(k) => k as u16,
                None => {
                    warn!("Unknown key '{}' for code {}, skipped", &record[1], code);
                    continue;
                }
            },
        };
        overrides.push(KeyOverride { code, key });
    }
    Ok(overrides)
}
