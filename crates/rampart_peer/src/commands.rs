#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Noop,
    Left,
    Right,
    Jump,
    Hit,
    Place,
    Axis(f32),
    Status,
    Quit,
    Help,
    InvalidUsage(String),
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Noop;
    }

    let input = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if input.is_empty() {
        return Command::Noop;
    }

    let mut head_tail = input.splitn(2, char::is_whitespace);
    let command = head_tail.next().unwrap_or_default().to_ascii_lowercase();
    let rest = head_tail.next().unwrap_or("").trim();

    match command.as_str() {
        "left" => Command::Left,
        "right" => Command::Right,
        "jump" => Command::Jump,
        "hit" => Command::Hit,
        "place" => Command::Place,
        "axis" => match rest.parse::<f32>() {
            Ok(value) if (-1.0..=1.0).contains(&value) => Command::Axis(value),
            _ => Command::InvalidUsage(
                "Usage: /axis <value>, where value is between -1.0 and 1.0".to_string(),
            ),
        },
        "status" => Command::Status,
        "quit" | "stop" => Command::Quit,
        "help" => Command::Help,
        _ => Command::Unknown(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, Command};

    #[test]
    fn parses_movement_and_action_commands() {
        assert_eq!(parse_command("left"), Command::Left);
        assert_eq!(parse_command("/right"), Command::Right);
        assert_eq!(parse_command("  jump "), Command::Jump);
        assert_eq!(parse_command("hit"), Command::Hit);
        assert_eq!(parse_command("place"), Command::Place);
        assert_eq!(parse_command("/axis -0.5"), Command::Axis(-0.5));
        assert_eq!(parse_command("status"), Command::Status);
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("stop"), Command::Quit);
    }

    #[test]
    fn reports_usage_errors_and_unknowns() {
        assert_eq!(
            parse_command("/axis fast"),
            Command::InvalidUsage(
                "Usage: /axis <value>, where value is between -1.0 and 1.0".to_string()
            )
        );
        assert_eq!(
            parse_command("/axis 3.0"),
            Command::InvalidUsage(
                "Usage: /axis <value>, where value is between -1.0 and 1.0".to_string()
            )
        );
        assert_eq!(parse_command("dance"), Command::Unknown("dance".to_string()));
        assert_eq!(parse_command(""), Command::Noop);
        assert_eq!(parse_command("/"), Command::Noop);
    }
}
