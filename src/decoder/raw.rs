use crate::core::strings::name_hash;
use crate::decoder::schema::{Column, ColumnKind};
use crate::types::canframe::{CanFrame, MessageDesc};
use crate::types::record::{self, Record};
use crate::types::value::Value;

const COLUMNS: [(&str, ColumnKind); 7] = [
    (record::TIME, ColumnKind::Instant),
    (record::OFFSET, ColumnKind::Long),
    (record::CHANNEL, ColumnKind::Int),
    (record::ERROR, ColumnKind::Boolean),
    (record::DIRECTION, ColumnKind::Text),
    (record::ID, ColumnKind::Long),
    (record::CONTENT, ColumnKind::Binary),
];

/// Pass-through decoder used when no database is configured.
///
/// Every frame becomes one record describing the frame itself; decode and
/// interpret are the same operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawDecoder;

impl RawDecoder {
    pub fn new() -> Self {
        RawDecoder
    }

    pub fn decode<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame) -> Record {
        let mut out: Record = Record::with_capacity(COLUMNS.len());
        self.decode_into(desc, frame, &mut out);
        out
    }

    pub fn decode_into<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame, out: &mut Record) {
        let values: [Value; 7] = [
            desc.timestamp(frame.offset_nanos)
                .map(Value::Instant)
                .unwrap_or_default(),
            Value::Long(frame.offset_nanos as i128),
            Value::Int(frame.channel_id as i64),
            Value::Boolean(frame.error),
            Value::Text(frame.direction.as_str().to_string()),
            Value::Long(frame.message_id as i128),
            Value::Binary(frame.payload().to_vec()),
        ];
        for ((name, _), value) in COLUMNS.iter().zip(values) {
            out.add_hashed(name, name_hash(name), value);
        }
    }

    pub fn schema(&self) -> Vec<Column> {
        COLUMNS
            .iter()
            .map(|(name, kind)| Column::new(name, *kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::canframe::{Direction, TraceMeta};

    #[test]
    fn describes_the_frame() {
        let mut frame = CanFrame::new(2, 0x1AB, vec![1, 2, 3, 4])
            .with_offset(500)
            .with_direction(Direction::Tx)
            .with_error(true);
        frame.data_length = 3;

        let rec = RawDecoder.decode(&TraceMeta::default(), &frame);
        assert_eq!(
            rec.names().collect::<Vec<_>>(),
            vec!["TIME", "OFFSET", "CHANNEL", "ERROR", "DIRECTION", "ID", "CONTENT"]
        );
        assert_eq!(rec.get("TIME"), Some(&Value::Null));
        assert_eq!(rec.get("OFFSET"), Some(&Value::Long(500)));
        assert_eq!(rec.get("CHANNEL"), Some(&Value::Int(2)));
        assert_eq!(rec.get("ERROR"), Some(&Value::Boolean(true)));
        assert_eq!(rec.get("DIRECTION"), Some(&Value::Text("Tx".into())));
        assert_eq!(rec.get("ID"), Some(&Value::Long(0x1AB)));
        assert_eq!(rec.get("CONTENT"), Some(&Value::Binary(vec![1, 2, 3])));
    }
}
