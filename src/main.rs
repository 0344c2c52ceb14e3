//! `traza` - scan resolution from the command line.
//!
//! Reads one scanned string per line from stdin and prints one JSON line per
//! input on stdout. Logs go to stderr.
//!
//! ```text
//! traza            # decode each line (bare identifier or envelope)
//! traza encode     # wrap each bare lot/pallet identifier in an envelope
//! ```

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use traza::config::{AppConfig, LoggingConfig};
use traza::domain::identity::{detect_entity_type, IdentityCodec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Decode,
    Encode,
}

fn init_tracing(logging: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(logging.env_filter())
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn decode_line(codec: &IdentityCodec, raw: &str) -> Value {
    match codec.decode(raw) {
        Ok(identity) => json!({
            "input": raw,
            "ok": true,
            "identity": identity,
        }),
        Err(err) => {
            debug!(code = %err.code(), "Scan rejected");
            json!({
                "input": raw,
                "ok": false,
                "code": err.code().to_string(),
                "message": err.to_string(),
            })
        }
    }
}

fn encode_line(codec: &IdentityCodec, raw: &str) -> Value {
    let encoded = match detect_entity_type(raw) {
        Some(entity_type) => codec.encode(raw, entity_type, None),
        None => codec.decode(raw).map(|decoded| decoded.envelope.to_json()),
    };
    match encoded {
        Ok(envelope) => json!({ "input": raw, "ok": true, "envelope": envelope }),
        Err(err) => json!({
            "input": raw,
            "ok": false,
            "code": err.code().to_string(),
            "message": err.to_string(),
        }),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging);

    let mode = match std::env::args().nth(1).as_deref() {
        None | Some("decode") => Mode::Decode,
        Some("encode") => Mode::Encode,
        Some(other) => {
            warn!(argument = other, "Unknown mode, expected 'decode' or 'encode'");
            return Err(format!("unknown mode '{}'", other).into());
        }
    };

    let codec = config.identity.codec();
    info!(
        app_tag = codec.app_tag(),
        format_version = codec.format_version(),
        mode = ?mode,
        "Reading scans from stdin"
    );

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut processed = 0usize;
    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            continue;
        }
        let output = match mode {
            Mode::Decode => decode_line(&codec, &line),
            Mode::Encode => encode_line(&codec, &line),
        };
        println!("{}", output);
        processed += 1;
    }

    info!(processed, "Done");
    Ok(())
}
