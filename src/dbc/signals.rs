use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};

use crate::config::BuildOptions;
use crate::core::strings::{first_quoted, split_required};
use crate::types::errors::DbcParseError;
use crate::types::signal::{ByteOrder, Signal, SignalDef};

/// Scans a trimmed `SG_` line.
///
/// Format:
/// SG_ <name> [M|mX] : <start>|<len>@<order><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers...>
///
/// The name is the first token before `:`, so multiplexer tags are dropped.
/// An empty or missing unit is `None`.
pub(crate) fn scan_signal(line: &str) -> Option<SignalDef> {
    let rest: &str = line.strip_prefix("SG_ ")?;

    let (head, rest) = split_required(rest, ':')?;
    let (start, rest) = split_required(rest, '|')?;
    let (length, rest) = split_required(rest, '@')?;
    let (order_sign, rest) = split_required(rest, '(')?;
    let (factor, rest) = split_required(rest, ',')?;
    let (offset, rest) = split_required(rest, ')')?;
    let (_, rest) = split_required(rest, '[')?;
    let (min, rest) = split_required(rest, '|')?;
    let (max, rest) = split_required(rest, ']')?;

    // "1+" → Intel/unsigned, "0-" → Motorola/signed
    let mut tag = order_sign.chars();
    let (Some(order), Some(sign), None) = (tag.next(), tag.next(), tag.next()) else {
        return None;
    };
    let byte_order: ByteOrder = ByteOrder::from_dbc(order)?;
    let signed: bool = match sign {
        '+' => false,
        '-' => true,
        _ => return None,
    };

    let name: &str = head.split_ascii_whitespace().next()?;
    let unit: Option<String> = first_quoted(rest)
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    Some(SignalDef {
        name: name.to_string(),
        start_bit: start.parse::<u16>().ok()?,
        bit_length: length.parse::<u16>().ok()?,
        byte_order,
        signed,
        factor: BigDecimal::from_str(factor).ok()?,
        offset: BigDecimal::from_str(offset).ok()?,
        min: BigDecimal::from_str(min).ok()?,
        max: BigDecimal::from_str(max).ok()?,
        unit,
    })
}

/// `true` iff `line` is a well-formed `SG_` line.
pub fn matches_attribute(line: &str) -> bool {
    scan_signal(line).is_some()
}

/// Builds the signal declared by an `SG_` line of message `message_name`.
///
/// With `use_qualified_name` the signal is named `<message>.<signal>`; without
/// `apply_formula` factor and offset are forced to 1 and 0.
pub fn build_attribute(
    line: &str,
    message_name: &str,
    options: &BuildOptions,
) -> Result<Signal, DbcParseError> {
    let mut def: SignalDef = scan_signal(line).ok_or_else(|| DbcParseError::MalformedSignal {
        line: line.to_string(),
    })?;
    if options.use_qualified_name {
        def.name = format!("{}.{}", message_name, def.name);
    }
    if !options.apply_formula {
        def.factor = BigDecimal::one();
        def.offset = BigDecimal::zero();
    }
    Ok(Signal::new(def))
}
