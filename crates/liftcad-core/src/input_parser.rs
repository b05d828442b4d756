//! 命令行数值输入解析
//!
//! 支持的格式：
//! - 绝对坐标: `100,50`
//! - 相对坐标: `@100,50`
//! - 相对极坐标: `@100<45`
//! - 数值: `100`
//! - 角度: `<45`
//! - 数值+角度: `4,2.5<90`（阵列的数量、间距与方向）
//!
//! 角度输入均为度，解析结果为弧度。非有限数值一律拒绝。

use crate::math::Point2;
use thiserror::Error;

/// 解析后的输入值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputValue {
    /// 点坐标
    Point(Point2),
    /// 单个数值（距离、半径）
    Number(f64),
    /// 角度（弧度）
    Angle(f64),
}

/// 阵列参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayParams {
    /// 总数（含原图元）
    pub count: usize,
    pub spacing: f64,
    /// 方向（弧度），默认沿 X 轴
    pub angle: f64,
}

/// 阵列总数上限，一次提交的副本数受此约束
pub const MAX_ARRAY_COUNT: usize = 10_000;

/// 解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Missing value: {0}")]
    MissingValue(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

/// 输入解析器
pub struct InputParser;

impl InputParser {
    /// 解析输入字符串
    ///
    /// `reference_point` 是当前命令上一步确定的点，相对坐标以它为基准。
    pub fn parse(input: &str, reference_point: Option<Point2>) -> Result<InputValue, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::MissingValue("empty input".to_string()));
        }

        if let Some(rest) = input.strip_prefix('<') {
            return Ok(InputValue::Angle(number(rest, "angle")?.to_radians()));
        }

        if let Some(rest) = input.strip_prefix('@') {
            let base = reference_point.ok_or_else(|| {
                ParseError::MissingValue("reference point required for relative input".to_string())
            })?;
            if let Some((len, angle)) = rest.split_once('<') {
                let length = number(len, "length")?;
                let angle = number(angle, "angle")?.to_radians();
                return Ok(InputValue::Point(polar_to_point(base, length, angle)));
            }
            let (dx, dy) = pair(rest)?;
            return Ok(InputValue::Point(Point2::new(base.x + dx, base.y + dy)));
        }

        if input.contains(',') {
            let (x, y) = pair(input)?;
            return Ok(InputValue::Point(Point2::new(x, y)));
        }

        Ok(InputValue::Number(number(input, "value")?))
    }

    /// 解析为点坐标
    pub fn parse_point(input: &str, reference_point: Option<Point2>) -> Result<Point2, ParseError> {
        match Self::parse(input, reference_point)? {
            InputValue::Point(p) => Ok(p),
            _ => Err(ParseError::InvalidFormat(format!("'{}' is not a point", input.trim()))),
        }
    }

    /// 解析为正数（距离、半径）
    pub fn parse_positive(input: &str, name: &str) -> Result<f64, ParseError> {
        let value = number(input, name)?;
        if value <= 0.0 {
            return Err(ParseError::OutOfRange(format!("{} must be positive, got {}", name, value)));
        }
        Ok(value)
    }

    /// 解析阵列参数 `count,spacing` 或 `count,spacing<angle`
    pub fn parse_array(input: &str) -> Result<ArrayParams, ParseError> {
        let input = input.trim();
        let (body, angle) = match input.split_once('<') {
            Some((body, angle)) => (body, number(angle, "angle")?.to_radians()),
            None => (input, 0.0),
        };
        let (count, spacing) = body
            .split_once(',')
            .ok_or_else(|| ParseError::InvalidFormat("expected 'count,spacing[<angle]'".to_string()))?;
        let count: usize = count
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidFormat(format!("invalid count: {}", count.trim())))?;
        if count < 2 {
            return Err(ParseError::OutOfRange(format!("count must be at least 2, got {}", count)));
        }
        if count > MAX_ARRAY_COUNT {
            return Err(ParseError::OutOfRange(format!(
                "count must be at most {}, got {}",
                MAX_ARRAY_COUNT, count
            )));
        }
        let spacing = number(spacing, "spacing")?;
        Ok(ArrayParams {
            count,
            spacing,
            angle,
        })
    }
}

fn number(text: &str, name: &str) -> Result<f64, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::MissingValue(name.to_string()));
    }
    let value: f64 = text
        .parse()
        .map_err(|_| ParseError::InvalidFormat(format!("invalid {}: {}", name, text)))?;
    if !value.is_finite() {
        return Err(ParseError::OutOfRange(format!("{} must be finite", name)));
    }
    Ok(value)
}

fn pair(text: &str) -> Result<(f64, f64), ParseError> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| ParseError::InvalidFormat(format!("expected 'x,y', got '{}'", text.trim())))?;
    Ok((number(x, "x")?, number(y, "y")?))
}

/// 将极坐标转换为点
fn polar_to_point(origin: Point2, distance: f64, angle: f64) -> Point2 {
    Point2::new(origin.x + distance * angle.cos(), origin.y + distance * angle.sin())
}
