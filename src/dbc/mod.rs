//! # dbc
//!
//! `dbc` turns `.dbc` sources into ready-to-use decoders and encoders.
//!
//! Only `BO_` and `SG_` lines carry meaning here; every other keyword closes
//! the current message and is otherwise ignored. Each source becomes one
//! channel, numbered from 1 by its position in the list.

pub(crate) mod channels;
pub mod messages;
pub mod signals;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use tracing::debug;

use crate::config::{BuildOptions, DbcSource};
use crate::decoder::{ChannelDecoder, ConsolidatedDecoder, MessageDecoder, RawDecoder};
use crate::encoder::MessageEncoder;
use crate::types::channel::Channel;
use crate::types::errors::{BuildError, DbcParseError};

pub use messages::{build_message, matches_message};
pub use signals::{build_attribute, matches_attribute};

/// Reads a DBC file as UTF-8, falling back to Windows-1252.
///
/// # Errors
/// - [`DbcParseError::OpenFile`] when the file cannot be opened.
/// - [`DbcParseError::Read`] on I/O errors while reading.
pub fn read_source(path: &Path) -> Result<String, DbcParseError> {
    let file: File = File::open(path).map_err(|source| DbcParseError::OpenFile {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader: BufReader<File> = BufReader::new(file);

    // read raw bytes
    let mut bytes: Vec<u8> = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| DbcParseError::Read {
            path: path.display().to_string(),
            source,
        })?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let (text, _, _) = WINDOWS_1252.decode(err.as_bytes());
            text.into_owned()
        }
    })
}

/// Parses every non-blank source into a post-processed channel.
/// Channels left without messages are omitted.
fn build_channels(sources: &[DbcSource], options: &BuildOptions) -> Result<Vec<Channel>, DbcParseError> {
    let mut seen: HashSet<u32> = HashSet::new();
    let mut channels: Vec<Channel> = Vec::with_capacity(sources.len());

    for (i, source) in sources.iter().enumerate() {
        if source.is_blank() {
            continue;
        }
        let channel_id: u32 = u32::try_from(i + 1).unwrap_or(u32::MAX);
        let channel: Channel = match source {
            DbcSource::Path(path) => channels::parse_channel(channel_id, &read_source(path)?, options)?,
            DbcSource::Contents(text) => channels::parse_channel(channel_id, text, options)?,
        };
        let channel: Channel = channels::finish_channel(channel, options, &mut seen);
        if channel.is_empty() {
            debug!(channel = channel_id, "no message left, channel skipped");
            continue;
        }
        channels.push(channel);
    }
    Ok(channels)
}

/// Builds a decoder over `sources`.
///
/// No sources gives the raw decoder. Otherwise the channels are merged into a
/// [`ConsolidatedDecoder`] or kept apart in a [`ChannelDecoder`], then narrowed
/// to `options.selected_attributes`.
///
/// # Errors
/// Any [`DbcParseError`] aborts the whole build.
///
/// # Example
/// ```rust
/// use dbc_codec::{BuildOptions, DbcSource, dbc};
///
/// let text = "BO_ 100 Engine: 1 Motor\n SG_ Rpm : 0|8@1+ (10,0) [0|2550] \"rpm\" Gateway\n";
/// let decoder = dbc::build_decoder(&DbcSource::from_contents([text]), &BuildOptions::default()).unwrap();
/// assert_eq!(decoder.schema_string(), "TIME instant,Rpm int");
/// ```
pub fn build_decoder(sources: &[DbcSource], options: &BuildOptions) -> Result<MessageDecoder, BuildError> {
    if sources.is_empty() {
        return Ok(MessageDecoder::Raw(RawDecoder));
    }

    let channels: Vec<Channel> = build_channels(sources, options)?;
    let mut decoder: MessageDecoder = if options.consolidate_schema {
        let mut d: ConsolidatedDecoder = ConsolidatedDecoder::new(options.output_offset);
        for channel in channels {
            d.add_channel(channel);
        }
        MessageDecoder::Consolidated(d)
    } else {
        let mut d: ChannelDecoder = ChannelDecoder::new(options.output_offset);
        for channel in channels {
            d.add_channel(channel);
        }
        MessageDecoder::Channel(d)
    };
    decoder.select(&options.selected_attributes);
    Ok(decoder)
}

/// Builds an encoder over `sources`. No sources gives an encoder that emits
/// no frames. Only the naming, formula and deduplication flags apply.
pub fn build_encoder(sources: &[DbcSource], options: &BuildOptions) -> Result<MessageEncoder, BuildError> {
    let mut encoder: MessageEncoder = MessageEncoder::new();
    for channel in build_channels(sources, options)? {
        for message in channel.into_messages() {
            encoder.add_message(message);
        }
    }
    Ok(encoder)
}

/// [`build_decoder`] over a comma-separated path list.
pub fn decoder_from_paths(paths: &str, options: &BuildOptions) -> Result<MessageDecoder, BuildError> {
    build_decoder(&DbcSource::from_path_list(paths), options)
}

/// [`build_decoder`] over pre-read file contents.
pub fn decoder_from_contents<I, S>(contents: I, options: &BuildOptions) -> Result<MessageDecoder, BuildError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    build_decoder(&DbcSource::from_contents(contents), options)
}

pub fn encoder_from_paths(paths: &str, options: &BuildOptions) -> Result<MessageEncoder, BuildError> {
    build_encoder(&DbcSource::from_path_list(paths), options)
}

pub fn encoder_from_contents<I, S>(contents: I, options: &BuildOptions) -> Result<MessageEncoder, BuildError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    build_encoder(&DbcSource::from_contents(contents), options)
}

/// ARXML databases are recognised but not decoded: a blank list gives the
/// raw decoder, anything else is [`BuildError::Unsupported`].
pub fn build_arxml_decoder(paths: &str, _options: &BuildOptions) -> Result<MessageDecoder, BuildError> {
    if paths.trim().is_empty() {
        return Ok(MessageDecoder::Raw(RawDecoder));
    }
    Err(BuildError::Unsupported {
        format: "arxml".to_string(),
    })
}

/// `true` when every non-blank entry of the comma-separated list ends in `.dbc`.
pub fn is_dbc(paths: &str) -> bool {
    has_extension(paths, ".dbc")
}

/// `true` when every non-blank entry of the comma-separated list ends in `.arxml`.
pub fn is_arxml(paths: &str) -> bool {
    has_extension(paths, ".arxml")
}

fn has_extension(paths: &str, extension: &str) -> bool {
    if paths.trim().is_empty() {
        return false;
    }
    paths
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .all(|p| p.to_lowercase().ends_with(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::canframe::{CanFrame, TraceMeta};
    use crate::types::record::Record;
    use crate::types::value::Value;
    use std::io::Write;

    const POWERTRAIN: &str = "BO_ 100 Engine: 2 Motor\n SG_ Rpm : 0|8@1+ (1,0) [0|255] \"\" X\n SG_ Gear : 8|4@1+ (1,0) [0|15] \"\" X\n";
    const BODY: &str = "BO_ 100 Door: 1 Body\n SG_ Open : 0|1@1+ (1,0) [0|1] \"\" X\nBO_ 200 Light: 1 Body\n SG_ Lamp : 0|8@1+ (1,0) [0|255] \"\" X\n";

    fn write_dbc(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> String {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path.display().to_string()
    }

    #[test]
    fn empty_sources_give_raw_decoder_and_null_encoder() {
        let opts = BuildOptions::default();
        assert!(decoder_from_paths("  ", &opts).unwrap().is_raw());
        assert!(decoder_from_contents(Vec::<String>::new(), &opts).unwrap().is_raw());
        let enc = encoder_from_paths("", &opts).unwrap();
        let mut rec = Record::new();
        rec.add("Rpm", Value::Int(1));
        assert!(enc.encode(&rec).is_empty());
    }

    #[test]
    fn channels_are_numbered_by_position() {
        let d = decoder_from_contents(["", POWERTRAIN, BODY], &BuildOptions::default()).unwrap();
        let MessageDecoder::Channel(channels) = &d else {
            panic!("expected a channel decoder");
        };
        assert!(!channels.contains_channel(1));
        assert_eq!(channels.channel(2).map(|c| c.len()), Some(1));
        assert_eq!(channels.channel(3).map(|c| c.len()), Some(2));
        assert_eq!(channels.ids().len(), 3);
    }

    #[test]
    fn consolidated_first_channel_wins() {
        let opts = BuildOptions::default().with_consolidate_schema(true);
        let d = decoder_from_contents([POWERTRAIN, BODY], &opts).unwrap();
        let rec = d
            .decode(&TraceMeta::default(), &CanFrame::new(2, 100, vec![0x11, 0x02]))
            .unwrap();
        assert_eq!(rec.get("Rpm"), Some(&Value::Int(0x11)));
        assert_eq!(rec.get("Open"), None);
        assert_eq!(d.schema_string(), "TIME instant,Rpm int,Gear int,Lamp int");
    }

    #[test]
    fn dedup_applies_in_channel_mode() {
        let opts = BuildOptions::default().with_deduplicate_message(true);
        let d = decoder_from_contents([POWERTRAIN, BODY], &opts).unwrap();
        assert!(d.message(2, 100).is_none());
        assert!(d.message(2, 200).is_some());
        assert!(d.message(1, 100).is_some());
    }

    #[test]
    fn selection_runs_after_build() {
        let opts = BuildOptions::default()
            .with_use_qualified_name(true)
            .with_selected_attributes(["Engine.Gear"]);
        let d = decoder_from_contents([POWERTRAIN, BODY], &opts).unwrap();
        assert_eq!(d.messages().count(), 1);
        assert_eq!(d.schema_string(), "TIME instant,Engine.Gear int");
    }

    #[test]
    fn reads_paths_and_windows_1252() {
        let dir = tempfile::tempdir().unwrap();
        let utf8 = write_dbc(&dir, "pt.dbc", POWERTRAIN.as_bytes());
        // 0xB0 is the degree sign in Windows-1252 and invalid UTF-8
        let mut latin = b"BO_ 7 Climate: 1 HVAC\n SG_ Temp : 0|8@1+ (1,-40) [-40|215] \"".to_vec();
        latin.extend_from_slice(&[0xB0, b'C', b'"', b'\n']);
        let cp1252 = write_dbc(&dir, "climate.dbc", &latin);

        let paths = format!("{utf8}, ,{cp1252}");
        assert!(is_dbc(&paths));
        let d = decoder_from_paths(&paths, &BuildOptions::default()).unwrap();
        let temp = d.message(3, 7).and_then(|m| m.signal("Temp")).unwrap();
        assert_eq!(temp.unit(), Some("°C"));
        assert!(d.message(1, 100).is_some());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = decoder_from_paths("/definitely/not/here.dbc", &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, BuildError::Parse(DbcParseError::OpenFile { .. })));
    }

    #[test]
    fn malformed_lines_abort_the_build() {
        let err = decoder_from_contents([" SG_ X : 0|8@1+ (1,0) [0|1]"], &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, BuildError::Parse(DbcParseError::OrphanSignal { .. })));
    }

    #[test]
    fn arxml_is_unsupported() {
        let opts = BuildOptions::default();
        assert!(build_arxml_decoder("", &opts).unwrap().is_raw());
        assert!(matches!(
            build_arxml_decoder("a.arxml", &opts),
            Err(BuildError::Unsupported { .. })
        ));
        assert!(is_arxml("a.ARXML, b.arxml"));
        assert!(!is_arxml("a.arxml,b.dbc"));
        assert!(!is_dbc(""));
    }

    #[test]
    fn encoder_from_contents_packs_frames() {
        let enc = encoder_from_contents([POWERTRAIN, BODY], &BuildOptions::default()).unwrap();
        let mut rec = Record::new();
        rec.add("Gear", Value::Int(2)).add("Lamp", Value::Int(9));
        let frames = enc.encode(&rec);
        assert_eq!(frames.len(), 2);
        assert_eq!((frames[0].channel_id, frames[0].message_id, frames[0].data.clone()), (1, 100, vec![0, 2]));
        assert_eq!((frames[1].channel_id, frames[1].message_id, frames[1].data.clone()), (2, 200, vec![9]));
    }
}
