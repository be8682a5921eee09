use std::time::Duration;

use crate::config::parse_duration_value;
use crate::domain::Point;

pub(crate) fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    parse_duration_value(value).map_err(|err| err.to_string())
}

pub(crate) fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("Invalid point '{}'. Expected 'x,y'.", value))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("Invalid x in '{}': {}", value, err))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|err| format!("Invalid y in '{}': {}", value, err))?;
    Ok(Point::new(x, y))
}
