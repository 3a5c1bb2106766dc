use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Raw intent bits carried by an `INPUT` frame.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct InputFlags: u8 {
        const LEFT  = 0b0000_0001;
        const RIGHT = 0b0000_0010;
        const JUMP  = 0b0000_0100;
        const HIT   = 0b0000_1000;
        const PLACE = 0b0001_0000;
    }
}

/// World-mutation delta pushed host -> client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileUpdate {
    Destroy { col: i32, row: i32 },
    Place { col: i32, row: i32 },
    Health { col: i32, row: i32, health: i32 },
}

/// One wire frame. Pipe-delimited text; field 0 is the tag.
///
/// - `HELLO|role` — greeting, host -> client on connect
/// - `INPUT|l|r|j|h[|p]` — client -> host raw intent, booleans as 0/1
/// - `POS|col|row[|facingRight]` — quantized position, both directions
/// - `TILE|destroy|x|y`, `TILE|place|x|y`, `TILE|hp|x|y|health` — host -> client
/// - `CHAR|name` — selected character, both directions, idempotent
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Hello { role: String },
    Input(InputFlags),
    Pos { col: i32, row: i32, facing_right: bool },
    Tile(TileUpdate),
    Char { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Empty,
    UnknownTag(String),
    MissingFields { tag: &'static str, got: usize, expected: usize },
    BadField { tag: &'static str, field: &'static str, value: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "empty frame"),
            DecodeError::UnknownTag(tag) => write!(f, "unknown tag '{tag}'"),
            DecodeError::MissingFields { tag, got, expected } => {
                write!(f, "{tag} frame has {got} fields, expected at least {expected}")
            }
            DecodeError::BadField { tag, field, value } => {
                write!(f, "{tag} frame has non-numeric {field} '{value}'")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

fn bit(v: bool) -> &'static str {
    if v {
        "1"
    } else {
        "0"
    }
}

pub fn encode(msg: &Message) -> String {
    match msg {
        Message::Hello { role } => format!("HELLO|{role}"),
        Message::Input(flags) => format!(
            "INPUT|{}|{}|{}|{}|{}",
            bit(flags.contains(InputFlags::LEFT)),
            bit(flags.contains(InputFlags::RIGHT)),
            bit(flags.contains(InputFlags::JUMP)),
            bit(flags.contains(InputFlags::HIT)),
            bit(flags.contains(InputFlags::PLACE)),
        ),
        Message::Pos { col, row, facing_right } => {
            format!("POS|{col}|{row}|{}", bit(*facing_right))
        }
        Message::Tile(TileUpdate::Destroy { col, row }) => format!("TILE|destroy|{col}|{row}"),
        Message::Tile(TileUpdate::Place { col, row }) => format!("TILE|place|{col}|{row}"),
        Message::Tile(TileUpdate::Health { col, row, health }) => {
            format!("TILE|hp|{col}|{row}|{health}")
        }
        Message::Char { name } => format!("CHAR|{name}"),
    }
}

fn parse_int(tag: &'static str, field: &'static str, value: &str) -> Result<i32, DecodeError> {
    value.parse::<i32>().map_err(|_| DecodeError::BadField {
        tag,
        field,
        value: value.to_string(),
    })
}

/// Decodes one frame. Booleans are `"1"`; any other value reads as false,
/// matching the tolerance of the wire contract. Numeric fields must parse.
pub fn decode(frame: &str) -> Result<Message, DecodeError> {
    let parts: Vec<&str> = frame.split('|').collect();
    let tag = *parts.first().ok_or(DecodeError::Empty)?;
    if tag.is_empty() {
        return Err(DecodeError::Empty);
    }

    match tag {
        "HELLO" => {
            if parts.len() < 2 {
                return Err(DecodeError::MissingFields { tag: "HELLO", got: parts.len(), expected: 2 });
            }
            Ok(Message::Hello { role: parts[1].to_string() })
        }
        "INPUT" => {
            if parts.len() < 5 {
                return Err(DecodeError::MissingFields { tag: "INPUT", got: parts.len(), expected: 5 });
            }
            let mut flags = InputFlags::empty();
            flags.set(InputFlags::LEFT, parts[1] == "1");
            flags.set(InputFlags::RIGHT, parts[2] == "1");
            flags.set(InputFlags::JUMP, parts[3] == "1");
            flags.set(InputFlags::HIT, parts[4] == "1");
            // `place` was a later addition to the frame; absent means 0.
            flags.set(InputFlags::PLACE, parts.get(5).is_some_and(|p| *p == "1"));
            Ok(Message::Input(flags))
        }
        "POS" => {
            if parts.len() < 3 {
                return Err(DecodeError::MissingFields { tag: "POS", got: parts.len(), expected: 3 });
            }
            let col = parse_int("POS", "col", parts[1])?;
            let row = parse_int("POS", "row", parts[2])?;
            let facing_right = parts.get(3).map_or(true, |p| *p == "1");
            Ok(Message::Pos { col, row, facing_right })
        }
        "TILE" => {
            if parts.len() < 4 {
                return Err(DecodeError::MissingFields { tag: "TILE", got: parts.len(), expected: 4 });
            }
            let col = parse_int("TILE", "x", parts[2])?;
            let row = parse_int("TILE", "y", parts[3])?;
            match parts[1] {
                "destroy" => Ok(Message::Tile(TileUpdate::Destroy { col, row })),
                "place" => Ok(Message::Tile(TileUpdate::Place { col, row })),
                "hp" => {
                    let raw = parts.get(4).ok_or(DecodeError::MissingFields {
                        tag: "TILE",
                        got: parts.len(),
                        expected: 5,
                    })?;
                    let health = parse_int("TILE", "health", raw)?;
                    Ok(Message::Tile(TileUpdate::Health { col, row, health }))
                }
                other => Err(DecodeError::UnknownTag(format!("TILE|{other}"))),
            }
        }
        "CHAR" => {
            if parts.len() < 2 {
                return Err(DecodeError::MissingFields { tag: "CHAR", got: parts.len(), expected: 2 });
            }
            Ok(Message::Char { name: parts[1].to_string() })
        }
        other => Err(DecodeError::UnknownTag(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, DecodeError, InputFlags, Message, TileUpdate};

    #[test]
    fn pos_round_trips_exactly() {
        let msg = Message::Pos { col: 5, row: 2, facing_right: true };
        let frame = encode(&msg);
        assert_eq!(frame, "POS|5|2|1");
        assert_eq!(decode(&frame).expect("decode POS"), msg);
    }

    #[test]
    fn pos_facing_defaults_to_right_when_absent() {
        assert_eq!(
            decode("POS|12|0").expect("short POS"),
            Message::Pos { col: 12, row: 0, facing_right: true }
        );
        assert_eq!(
            decode("POS|12|0|0").expect("full POS"),
            Message::Pos { col: 12, row: 0, facing_right: false }
        );
    }

    #[test]
    fn input_place_field_is_optional() {
        let legacy = decode("INPUT|0|1|0|1").expect("four-field INPUT");
        assert_eq!(legacy, Message::Input(InputFlags::RIGHT | InputFlags::HIT));

        let full = decode("INPUT|1|0|1|0|1").expect("five-field INPUT");
        assert_eq!(
            full,
            Message::Input(InputFlags::LEFT | InputFlags::JUMP | InputFlags::PLACE)
        );

        let round = decode(&encode(&legacy)).expect("re-decode");
        assert_eq!(round, legacy);
    }

    #[test]
    fn tile_variants_round_trip() {
        for msg in [
            Message::Tile(TileUpdate::Destroy { col: 9, row: 0 }),
            Message::Tile(TileUpdate::Place { col: 30, row: 6 }),
            Message::Tile(TileUpdate::Health { col: 3, row: 12, health: 20 }),
        ] {
            assert_eq!(decode(&encode(&msg)).expect("tile round trip"), msg);
        }
    }

    #[test]
    fn short_frames_are_rejected_not_crashed() {
        assert_eq!(
            decode("POS|5"),
            Err(DecodeError::MissingFields { tag: "POS", got: 2, expected: 3 })
        );
        assert_eq!(
            decode("INPUT|1|0"),
            Err(DecodeError::MissingFields { tag: "INPUT", got: 3, expected: 5 })
        );
        assert_eq!(
            decode("TILE|hp|3|4"),
            Err(DecodeError::MissingFields { tag: "TILE", got: 4, expected: 5 })
        );
        assert_eq!(decode(""), Err(DecodeError::Empty));
    }

    #[test]
    fn bad_numbers_and_unknown_tags_are_rejected() {
        assert!(matches!(decode("POS|five|2"), Err(DecodeError::BadField { .. })));
        assert!(matches!(decode("TILE|destroy|x|0"), Err(DecodeError::BadField { .. })));
        assert_eq!(decode("NOPE|1|2"), Err(DecodeError::UnknownTag("NOPE".into())));
        assert!(matches!(decode("TILE|melt|1|2"), Err(DecodeError::UnknownTag(_))));
    }

    #[test]
    fn hello_and_char_carry_their_payloads() {
        assert_eq!(
            decode("HELLO|host").expect("hello"),
            Message::Hello { role: "host".into() }
        );
        assert_eq!(
            decode(&encode(&Message::Char { name: "Leo".into() })).expect("char"),
            Message::Char { name: "Leo".into() }
        );
    }
}
