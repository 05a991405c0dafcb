use std::io::Write;
use std::path::PathBuf;

use engine::codec::{self, FIELD_MAX};
use engine::{JsonFileRecordStore, PersonalRecord, PersonalRecordBook, RecordStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Encode { time_seconds: i64, kills: i64 },
    Decode { encoded: i64 },
    Records { path: PathBuf },
}

pub fn parse_command(args: &[String]) -> Result<CommandKind, String> {
    let command = args
        .first()
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[1..];

    match command {
        "encode" => {
            let [time, kills] = command_args else {
                return Err("encode requires <time_seconds> <kills>".to_string());
            };
            Ok(CommandKind::Encode {
                time_seconds: parse_field("time_seconds", time)?,
                kills: parse_field("kills", kills)?,
            })
        }
        "decode" => {
            let [value] = command_args else {
                return Err("decode requires <encoded>".to_string());
            };
            let encoded = value
                .parse::<i64>()
                .map_err(|_| format!("invalid encoded value '{value}' (expected i64)"))?;
            Ok(CommandKind::Decode { encoded })
        }
        "records" => {
            let [path] = command_args else {
                return Err("records requires <path>".to_string());
            };
            Ok(CommandKind::Records {
                path: PathBuf::from(path),
            })
        }
        other => Err(format!("unknown subcommand '{other}'")),
    }
}

fn parse_field(name: &str, raw: &str) -> Result<i64, String> {
    let value = raw
        .parse::<i64>()
        .map_err(|_| format!("invalid {name} value '{raw}' (expected integer)"))?;
    if !(0..=FIELD_MAX).contains(&value) {
        return Err(format!("{name} must be within 0..={FIELD_MAX}, got {value}"));
    }
    Ok(value)
}

pub fn run<W: Write>(kind: CommandKind, out: &mut W) -> Result<(), String> {
    match kind {
        CommandKind::Encode {
            time_seconds,
            kills,
        } => write_line(out, &codec::encode(time_seconds, kills).to_string()),
        CommandKind::Decode { encoded } => {
            let (time_seconds, kills) = codec::decode(encoded);
            write_line(out, &format!("time_seconds={time_seconds} kills={kills}"))
        }
        CommandKind::Records { path } => {
            let store = JsonFileRecordStore::new(path);
            let encoded = store
                .load_encoded()
                .map_err(|error| error.to_string())?;
            let book = PersonalRecordBook::from_encoded(encoded.len(), &encoded);
            if book.entries().is_empty() {
                return write_line(out, "no records");
            }
            for (index, record) in book.entries().iter().enumerate() {
                write_line(out, &format_record_line(index + 1, *record))?;
            }
            Ok(())
        }
    }
}

pub fn format_record_line(rank: usize, record: PersonalRecord) -> String {
    format!(
        "{rank:>2}. {time}s {kills} kills (score {score}, encoded {encoded})",
        time = record.time_seconds(),
        kills = record.kills(),
        score = record.ranking_score(),
        encoded = record.encoded()
    )
}

fn write_line<W: Write>(out: &mut W, line: &str) -> Result<(), String> {
    writeln!(out, "{line}").map_err(|error| format!("failed to write output: {error}"))
}
