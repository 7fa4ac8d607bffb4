use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{Duration, TimeZone, Utc};
use dbc_codec::{BuildOptions, CanFrame, ColumnKind, MessageDecoder, Record, TraceMeta, Value, dbc};

const VEHICLE: &str = r#"
VERSION ""

NS_ :
	CM_
	BA_DEF_

BS_:

BU_: Engine Body Gateway

BO_ 256 EngineData: 8 Engine
 SG_ EngineSpeed : 0|16@1+ (0.25,0) [0|16383.75] "rpm" Gateway
 SG_ CoolantTemp : 16|8@1+ (1,-40) [-40|215] "degC" Gateway
 SG_ Torque : 31|12@0- (1,0) [-2048|2047] "Nm" Gateway
 SG_ Running : 40|1@1+ (1,0) [0|1] "" Gateway
 SG_ Odometer : 48|16@1+ (0.1,0) [0|6553.5] "km" Gateway

BO_ 2147484160 BodyExt: 8 Body
 SG_ Counter : 7|32@0+ (1,0) [0|4294967295] "" Gateway
 SG_ Mileage : 32|32@1- (1,0) [-2147483648|2147483647] "" Gateway

CM_ SG_ 256 EngineSpeed "Crankshaft speed";
BA_DEF_ BO_ "GenMsgCycleTime" INT 0 10000;
VAL_ 256 Running 1 "On" 0 "Off" ;
"#;

fn decoder(options: &BuildOptions) -> MessageDecoder {
    dbc::decoder_from_contents([VEHICLE], options).unwrap()
}

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

#[test]
fn schema_reflects_representations() {
    let d = decoder(&BuildOptions::default().with_output_offset(true));
    assert_eq!(
        d.schema_string(),
        "TIME instant,OFFSET long,EngineSpeed double,CoolantTemp int,Torque int,Running int,Odometer double,Counter int,Mileage long"
    );
    let kinds: Vec<ColumnKind> = d.schema().into_iter().map(|c| c.kind).collect();
    assert_eq!(kinds[2], ColumnKind::Double { whole: false });
    let template = d.template_record();
    assert_eq!(template.len(), 9);
    assert!(template.iter().all(|(_, v)| v.is_null()));
}

#[test]
fn decodes_a_frame() {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let meta = TraceMeta::new(start);
    // EngineSpeed raw 0x1F40 = 8000 → 2000 rpm; Coolant 130 → 90; Torque 0xFFE → -2
    let data = vec![0x40, 0x1F, 130, 0xFF, 0xE0, 0x01, 0x10, 0x27];
    let frame = CanFrame::new(1, 256, data).with_offset(2_500);

    let d = decoder(&BuildOptions::default());
    let rec = d.decode(&meta, &frame).unwrap();
    assert_eq!(rec.get("TIME"), Some(&Value::Instant(start + Duration::nanoseconds(2_500))));
    assert_eq!(rec.get("EngineSpeed"), Some(&Value::Double(2000.0)));
    assert_eq!(rec.get("CoolantTemp"), Some(&Value::Int(90)));
    assert_eq!(rec.get("Torque"), Some(&Value::Int(-2)));
    assert_eq!(rec.get("Running"), Some(&Value::Int(1)));
    assert_eq!(rec.get("Odometer"), Some(&Value::Double(1000.0)));

    let raw = d.interpret(&meta, &frame).unwrap();
    assert_eq!(raw.get("EngineSpeed"), Some(&Value::Long(8000)));
    assert_eq!(raw.get("CoolantTemp"), Some(&Value::Int(130)));

    // other channel, short frame, unknown id
    assert!(d.decode(&meta, &CanFrame::new(2, 256, vec![0; 8])).is_none());
    assert!(d.decode(&meta, &CanFrame::new(1, 256, vec![0; 7])).is_none());
    assert!(d.decode(&meta, &CanFrame::new(1, 999, vec![0; 8])).is_none());
}

#[test]
fn encode_then_decode_scaled_values() {
    let options = BuildOptions::default();
    let d = decoder(&options);
    let enc = dbc::encoder_from_contents([VEHICLE], &options).unwrap();

    let mut rec = Record::new();
    rec.add("EngineSpeed", Value::Double(1234.5))
        .add("CoolantTemp", Value::Int(-12))
        .add("Torque", Value::Int(-700))
        .add("Running", Value::Boolean(true))
        .add("Odometer", Value::Decimal(dec("4321.5")));

    let frames = enc.encode(&rec);
    assert_eq!(frames.len(), 1);
    let frame = &frames[0];
    assert_eq!((frame.channel_id, frame.message_id, frame.extended), (1, 256, false));
    assert_eq!(frame.data.len(), 8);

    let back = d.decode(&TraceMeta::default(), frame).unwrap();
    assert_eq!(back.get("EngineSpeed"), Some(&Value::Double(1234.5)));
    assert_eq!(back.get("CoolantTemp"), Some(&Value::Int(-12)));
    assert_eq!(back.get("Torque"), Some(&Value::Int(-700)));
    assert_eq!(back.get("Running"), Some(&Value::Int(1)));
    assert_eq!(back.get("Odometer"), Some(&Value::Double(4321.5)));
}

#[test]
fn extended_frames_round_trip() {
    let options = BuildOptions::default();
    let enc = dbc::encoder_from_contents([VEHICLE], &options).unwrap();
    let mut rec = Record::new();
    rec.add("Mileage", Value::Long(-5)).add("Counter", Value::Long(0xDEAD_BEEF));

    let frames = enc.encode(&rec);
    assert_eq!(frames.len(), 1);
    let frame = &frames[0];
    assert_eq!(frame.message_id, 0x200);
    assert!(frame.extended);
    assert_eq!(&frame.data[..4], &[0xDE, 0xAD, 0xBE, 0xEF]);

    let back = decoder(&options).decode(&TraceMeta::default(), frame).unwrap();
    assert_eq!(back.get("Counter"), Some(&Value::Int(0xDEAD_BEEF)));
    assert_eq!(back.get("Mileage"), Some(&Value::Long(-5)));
}

#[test]
fn projection_and_raw_mode() {
    let options = BuildOptions::default()
        .with_consolidate_schema(true)
        .with_apply_formula(false)
        .with_selected_attributes(["CoolantTemp", "Counter"]);
    let d = decoder(&options);
    assert_eq!(d.schema_string(), "TIME instant,CoolantTemp int,Counter int");

    let frame = CanFrame::new(9, 256, vec![0, 0, 130, 0, 0, 0, 0, 0]);
    let rec = d.compute(&TraceMeta::default(), &frame, true).unwrap();
    // formula disabled at build time: the raw value comes back
    assert_eq!(rec.get("CoolantTemp"), Some(&Value::Int(130)));
    assert_eq!(rec.len(), 2);
}

#[test]
fn raw_decoder_without_sources() {
    let d = dbc::decoder_from_paths("", &BuildOptions::default()).unwrap();
    assert_eq!(
        d.schema_string(),
        "TIME instant,OFFSET long,CHANNEL int,ERROR boolean,DIRECTION string,ID long,CONTENT binary"
    );
    let rec = d.decode(&TraceMeta::default(), &CanFrame::new(4, 0x7DF, vec![2, 1, 0])).unwrap();
    assert_eq!(rec.get("ID"), Some(&Value::Long(0x7DF)));
    assert_eq!(rec.get("CONTENT"), Some(&Value::Binary(vec![2, 1, 0])));
    assert_eq!(rec.get("DIRECTION"), Some(&Value::Text("Rx".into())));
}
