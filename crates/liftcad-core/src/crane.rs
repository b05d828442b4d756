//! 起重机几何与能力模型
//!
//! 局部坐标系：回转中心在原点，吊臂在 +X 方向；高度沿 Z 轴。
//! 起重机规格是不可变的参考数据，创建时校验。
//!
//! 能力查询规则：
//! - 半径 ≤ 3 m 时为最大起重量
//! - 半径 ≥ 最大半径时为最大起重量的 3%
//! - 其间有能力表则按相邻两个样本线性插值，否则按指数衰减
//!
//! 结果总是不低于 3% 下限，因此在整个半径范围上单调不增。

use crate::block_library::Placement;
use crate::entity::{BlockInstance, DrawingElement, ElementId, ElementKind};
use crate::error::{CoreError, CoreResult};
use crate::layer::LayerId;
use crate::math::{Point2, Point3, Vector2};
use crate::transform::Transform2D;
use serde::{Deserialize, Serialize};

/// 该半径以内按最大起重量计算
pub const FULL_CAPACITY_RADIUS: f64 = 3.0;

/// 最大半径处的能力下限（占最大起重量的比例）
pub const CAPACITY_FLOOR_FRACTION: f64 = 0.03;

/// 能力表中的一个样本
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacitySample {
    /// 工作半径（m）
    pub radius: f64,
    /// 额定起重量（kg）
    pub capacity: f64,
}

/// 能力表：半径严格递增，起重量单调不增
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityChart {
    samples: Vec<CapacitySample>,
}

impl CapacityChart {
    /// 校验后创建
    pub fn new(samples: Vec<CapacitySample>) -> CoreResult<Self> {
        let chart = Self { samples };
        chart.validate_order()?;
        Ok(chart)
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> CoreResult<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(radius, capacity)| CapacitySample { radius, capacity })
                .collect(),
        )
    }

    pub fn samples(&self) -> &[CapacitySample] {
        &self.samples
    }

    fn validate_order(&self) -> CoreResult<()> {
        if self.samples.is_empty() {
            return Err(CoreError::integrity("capacity chart", "chart has no samples"));
        }
        for (i, s) in self.samples.iter().enumerate() {
            if !s.radius.is_finite() || !s.capacity.is_finite() || s.radius < 0.0 || s.capacity < 0.0 {
                return Err(CoreError::integrity(
                    "capacity chart",
                    format!("sample {} is not a finite non-negative pair", i),
                ));
            }
        }
        for (i, pair) in self.samples.windows(2).enumerate() {
            if pair[1].radius <= pair[0].radius {
                return Err(CoreError::integrity(
                    "capacity chart",
                    format!(
                        "radius must be strictly increasing (sample {}: {} after {})",
                        i + 1,
                        pair[1].radius,
                        pair[0].radius
                    ),
                ));
            }
            if pair[1].capacity > pair[0].capacity {
                return Err(CoreError::integrity(
                    "capacity chart",
                    format!(
                        "capacity must be non-increasing (sample {}: {} after {})",
                        i + 1,
                        pair[1].capacity,
                        pair[0].capacity
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// 底盘（平面矩形，以回转中心为中心）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChassisSpec {
    pub length: f64,
    pub width: f64,
}

/// 吊臂
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoomSpec {
    /// 全缩回长度
    pub base_length: f64,
    /// 全伸出长度
    pub max_length: f64,
    /// 吊臂根部铰点到回转中心的水平距离
    pub pivot_offset: f64,
    /// 铰点离地高度
    pub pivot_height: f64,
}

/// 配重（位于回转中心后方）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterweightSpec {
    /// 回转中心到配重前沿的距离
    pub offset: f64,
    pub length: f64,
    pub width: f64,
}

/// 支腿
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutriggerSpec {
    /// 支腿垫中心的纵向半距
    pub longitudinal: f64,
    /// 支腿垫中心的横向半距（全伸出）
    pub lateral: f64,
    /// 支腿垫边长
    pub pad_size: f64,
}

/// 起重机规格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraneSpec {
    pub model: String,
    /// 最大起重量（kg）
    pub max_capacity: f64,
    /// 最大工作半径（m）
    pub max_radius: f64,
    pub chassis: ChassisSpec,
    pub boom: BoomSpec,
    pub counterweight: CounterweightSpec,
    pub outriggers: OutriggerSpec,
    /// 显式能力表，存在时优先于指数衰减
    #[serde(default)]
    pub chart: Option<CapacityChart>,
}

impl CraneSpec {
    /// 从 JSON 加载并校验
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let spec: CraneSpec =
            serde_json::from_str(json).map_err(|e| CoreError::integrity("crane spec", e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let context = || format!("crane '{}'", self.model);
        let positive = [
            ("max_capacity", self.max_capacity),
            ("chassis.length", self.chassis.length),
            ("chassis.width", self.chassis.width),
            ("boom.base_length", self.boom.base_length),
            ("boom.max_length", self.boom.max_length),
            ("counterweight.length", self.counterweight.length),
            ("counterweight.width", self.counterweight.width),
            ("outriggers.longitudinal", self.outriggers.longitudinal),
            ("outriggers.lateral", self.outriggers.lateral),
            ("outriggers.pad_size", self.outriggers.pad_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(CoreError::integrity(context(), format!("{} must be positive", name)));
            }
        }
        if !(self.max_radius > FULL_CAPACITY_RADIUS) || !self.max_radius.is_finite() {
            return Err(CoreError::integrity(
                context(),
                format!("max_radius must exceed {} m", FULL_CAPACITY_RADIUS),
            ));
        }
        if self.boom.base_length > self.boom.max_length {
            return Err(CoreError::integrity(context(), "boom base_length exceeds max_length"));
        }
        if let Some(chart) = &self.chart {
            chart.validate_order().map_err(|e| match e {
                CoreError::DataIntegrity { reason, .. } => CoreError::integrity(context(), reason),
                other => other,
            })?;
            if let Some(s) = chart.samples.iter().find(|s| s.capacity > self.max_capacity) {
                return Err(CoreError::integrity(
                    context(),
                    format!("chart capacity {} at {} m exceeds max_capacity", s.capacity, s.radius),
                ));
            }
        }
        Ok(())
    }

    /// 最大半径处的能力下限
    pub fn capacity_floor(&self) -> f64 {
        self.max_capacity * CAPACITY_FLOOR_FRACTION
    }
}

/// 吊臂姿态
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoomPose {
    /// 仰角（度）
    pub angle: f64,
    /// 伸出比例 [0, 1]
    pub extension: f64,
}

impl BoomPose {
    pub fn new(angle: f64, extension: f64) -> Self {
        Self { angle, extension }
    }
}

/// 吊臂顶端位置（局部坐标，X 为水平方向，Z 为高度）
///
/// 伸出比例会被截断到 [0, 1]。
pub fn boom_tip(spec: &CraneSpec, angle_degrees: f64, extension: f64) -> Point3 {
    let extension = extension.clamp(0.0, 1.0);
    let length = spec.boom.base_length + (spec.boom.max_length - spec.boom.base_length) * extension;
    let (s, c) = angle_degrees.to_radians().sin_cos();
    Point3::new(
        spec.boom.pivot_offset + length * c,
        0.0,
        spec.boom.pivot_height + length * s,
    )
}

/// 吊臂顶端到回转中心的水平距离
pub fn boom_radius(spec: &CraneSpec, angle_degrees: f64, extension: f64) -> f64 {
    let tip = boom_tip(spec, angle_degrees, extension);
    (tip.x * tip.x + tip.y * tip.y).sqrt()
}

/// 给定半径处的额定起重量
pub fn capacity_at_radius(spec: &CraneSpec, radius: f64) -> f64 {
    let floor = spec.capacity_floor();
    if radius.is_nan() {
        return floor;
    }
    if radius <= FULL_CAPACITY_RADIUS {
        return spec.max_capacity;
    }
    if radius >= spec.max_radius {
        return floor;
    }

    let value = match &spec.chart {
        Some(chart) => chart_lookup(spec, chart, radius),
        None => {
            // 在 max_radius 处正好衰减到下限
            let k = (1.0 / CAPACITY_FLOOR_FRACTION).ln() / (spec.max_radius - FULL_CAPACITY_RADIUS);
            spec.max_capacity * (-k * (radius - FULL_CAPACITY_RADIUS)).exp()
        }
    };
    value.max(floor)
}

/// 在相邻样本间线性插值
///
/// 插值节点为 (3, 最大起重量)、(3, max_radius) 之间的样本、(max_radius, 下限)。
fn chart_lookup(spec: &CraneSpec, chart: &CapacityChart, radius: f64) -> f64 {
    let mut lower = CapacitySample {
        radius: FULL_CAPACITY_RADIUS,
        capacity: spec.max_capacity,
    };
    let knots = chart
        .samples
        .iter()
        .copied()
        .filter(|s| s.radius > FULL_CAPACITY_RADIUS && s.radius < spec.max_radius)
        .chain(std::iter::once(CapacitySample {
            radius: spec.max_radius,
            capacity: spec.capacity_floor(),
        }));

    for upper in knots {
        if radius <= upper.radius {
            let t = (radius - lower.radius) / (upper.radius - lower.radius);
            return lower.capacity + (upper.capacity - lower.capacity) * t;
        }
        lower = upper;
    }
    spec.capacity_floor()
}

/// 吊装计划
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiftPlan {
    /// 吊物重量（kg）
    pub load_weight: f64,
    /// 索具重量（kg），计入吊钩载荷
    #[serde(default)]
    pub rigging_weight: f64,
    /// 回转中心位置
    pub crane_base: Point2,
    pub load_position: Point2,
}

impl LiftPlan {
    pub fn radius(&self) -> f64 {
        (self.load_position - self.crane_base).norm()
    }

    pub fn hook_load(&self) -> f64 {
        self.load_weight + self.rigging_weight
    }
}

/// 能力校核结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiftCheck {
    pub radius: f64,
    /// 该半径处的额定起重量
    pub capacity: f64,
    pub hook_load: f64,
    pub can_lift: bool,
    /// 能力不足的差额，可吊时为 0
    pub shortfall: f64,
    /// 吊钩载荷 / 额定起重量
    pub utilisation: f64,
}

/// 在给定半径处校核载荷
pub fn check_capacity(spec: &CraneSpec, radius: f64, load: f64) -> LiftCheck {
    let capacity = capacity_at_radius(spec, radius);
    let can_lift = capacity >= load;
    LiftCheck {
        radius,
        capacity,
        hook_load: load,
        can_lift,
        shortfall: if can_lift { 0.0 } else { load - capacity },
        utilisation: if capacity > 0.0 { load / capacity } else { f64::INFINITY },
    }
}

/// 校核吊装计划
pub fn check_lift(spec: &CraneSpec, plan: &LiftPlan) -> LiftCheck {
    let check = check_capacity(spec, plan.radius(), plan.hook_load());
    tracing::debug!(
        model = %spec.model,
        radius = check.radius,
        capacity = check.capacity,
        hook_load = check.hook_load,
        can_lift = check.can_lift,
        "lift check"
    );
    check
}

/// 支腿占地
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    /// 四个支腿垫中心：左前、右前、右后、左后
    pub pads: [Point2; 4],
    /// 外包矩形（逆时针）
    pub outline: [Point2; 4],
}

impl Footprint {
    pub fn area(&self) -> f64 {
        crate::geometry::polygon_area(&self.outline).abs()
    }
}

/// 支腿占地（世界坐标），`rotation` 为底盘朝向（度）
pub fn outrigger_footprint(spec: &CraneSpec, base: Point2, rotation: f64) -> Footprint {
    let t = Transform2D::placement(base, 1.0, rotation);
    let o = &spec.outriggers;
    let (lx, ly) = (o.longitudinal, o.lateral);
    let (ex, ey) = (lx + o.pad_size / 2.0, ly + o.pad_size / 2.0);
    let local = |x: f64, y: f64| t.apply(&Point2::new(x, y));
    Footprint {
        pads: [local(lx, ly), local(lx, -ly), local(-lx, -ly), local(-lx, ly)],
        outline: [local(-ex, -ey), local(ex, -ey), local(ex, ey), local(-ex, ey)],
    }
}

/// 配重尾部回转半径
pub fn counterweight_swing_radius(spec: &CraneSpec) -> f64 {
    let c = &spec.counterweight;
    Vector2::new(c.offset + c.length, c.width / 2.0).norm()
}

/// 生成起重机平面图块
///
/// 子元素：底盘、四根支腿梁与支腿垫、配重、吊臂投影、吊钩。
/// 块名为 `crane:<model>`，放置后即为普通图元。
pub fn crane_block(spec: &CraneSpec, placement: Placement, pose: BoomPose, layer: LayerId) -> CoreResult<BlockInstance> {
    spec.validate()?;
    let mut kinds = Vec::with_capacity(12);

    let (hl, hw) = (spec.chassis.length / 2.0, spec.chassis.width / 2.0);
    kinds.push(ElementKind::rectangle(Point2::new(-hl, -hw), Point2::new(hl, hw)));

    let o = &spec.outriggers;
    let half_pad = o.pad_size / 2.0;
    for (sx, sy) in [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0)] {
        let x = sx * o.longitudinal;
        kinds.push(ElementKind::line(Point2::new(x, sy * hw), Point2::new(x, sy * o.lateral)));
        let pad = Point2::new(x, sy * o.lateral);
        kinds.push(ElementKind::rectangle(
            Point2::new(pad.x - half_pad, pad.y - half_pad),
            Point2::new(pad.x + half_pad, pad.y + half_pad),
        ));
    }

    let c = &spec.counterweight;
    kinds.push(ElementKind::rectangle(
        Point2::new(-c.offset - c.length, -c.width / 2.0),
        Point2::new(-c.offset, c.width / 2.0),
    ));

    let radius = boom_radius(spec, pose.angle, pose.extension);
    kinds.push(ElementKind::line(
        Point2::new(spec.boom.pivot_offset, 0.0),
        Point2::new(radius, 0.0),
    ));
    kinds.push(ElementKind::circle(Point2::new(radius, 0.0), 0.5));

    let children = kinds
        .into_iter()
        .enumerate()
        .map(|(i, kind)| DrawingElement::new(ElementId(i as u64 + 1), kind, layer))
        .collect();
    let mut block = BlockInstance::new(format!("crane:{}", spec.model), placement.origin, children);
    placement.apply(&mut block);
    Ok(block)
}

/// 内置的参考机型
pub fn catalog() -> Vec<CraneSpec> {
    vec![
        CraneSpec {
            model: "AT-50".to_string(),
            max_capacity: 50_000.0,
            max_radius: 40.0,
            chassis: ChassisSpec {
                length: 11.0,
                width: 2.55,
            },
            boom: BoomSpec {
                base_length: 10.2,
                max_length: 38.0,
                pivot_offset: 0.8,
                pivot_height: 2.6,
            },
            counterweight: CounterweightSpec {
                offset: 2.0,
                length: 2.0,
                width: 2.4,
            },
            outriggers: OutriggerSpec {
                longitudinal: 3.1,
                lateral: 3.0,
                pad_size: 0.6,
            },
            chart: Some(CapacityChart {
                samples: samples(&[
                    (3.0, 50_000.0),
                    (5.0, 45_000.0),
                    (6.0, 40_000.0),
                    (8.0, 32_000.0),
                    (10.0, 26_000.0),
                    (14.0, 18_000.0),
                    (18.0, 12_500.0),
                    (22.0, 9_000.0),
                    (26.0, 6_500.0),
                    (30.0, 4_800.0),
                    (34.0, 3_500.0),
                    (38.0, 2_400.0),
                ]),
            }),
        },
        CraneSpec {
            model: "AT-100".to_string(),
            max_capacity: 100_000.0,
            max_radius: 56.0,
            chassis: ChassisSpec {
                length: 13.5,
                width: 2.75,
            },
            boom: BoomSpec {
                base_length: 11.4,
                max_length: 52.0,
                pivot_offset: 1.0,
                pivot_height: 3.0,
            },
            counterweight: CounterweightSpec {
                offset: 2.2,
                length: 2.4,
                width: 2.6,
            },
            outriggers: OutriggerSpec {
                longitudinal: 3.6,
                lateral: 3.6,
                pad_size: 0.8,
            },
            chart: Some(CapacityChart {
                samples: samples(&[
                    (3.0, 100_000.0),
                    (5.0, 88_000.0),
                    (8.0, 68_000.0),
                    (10.0, 58_000.0),
                    (12.0, 50_000.0),
                    (16.0, 38_000.0),
                    (20.0, 29_000.0),
                    (24.0, 22_500.0),
                    (28.0, 17_500.0),
                    (32.0, 13_800.0),
                    (36.0, 11_000.0),
                    (40.0, 8_800.0),
                    (44.0, 7_000.0),
                    (48.0, 5_600.0),
                    (52.0, 4_400.0),
                ]),
            }),
        },
    ]
}

/// 按型号查找内置机型（不区分大小写）
pub fn find_model(model: &str) -> Option<CraneSpec> {
    catalog().into_iter().find(|s| s.model.eq_ignore_ascii_case(model))
}

fn samples(pairs: &[(f64, f64)]) -> Vec<CapacitySample> {
    pairs
        .iter()
        .map(|&(radius, capacity)| CapacitySample { radius, capacity })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn at50() -> CraneSpec {
        find_model("AT-50").unwrap()
    }

    #[test]
    fn test_catalog_is_valid() {
        for spec in catalog() {
            spec.validate().unwrap();
        }
    }

    #[test]
    fn test_capacity_boundaries() {
        let spec = at50();
        assert_eq!(capacity_at_radius(&spec, 0.0), 50_000.0);
        assert_eq!(capacity_at_radius(&spec, 3.0), 50_000.0);
        assert_eq!(capacity_at_radius(&spec, 40.0), 1_500.0);
        assert_eq!(capacity_at_radius(&spec, 100.0), 1_500.0);
    }

    #[test]
    fn test_chart_interpolation() {
        let spec = at50();
        assert!(approx_eq!(f64, capacity_at_radius(&spec, 6.0), 40_000.0, ulps = 4));
        assert!(approx_eq!(f64, capacity_at_radius(&spec, 7.0), 36_000.0, ulps = 4));
        // 3 到第一个样本之间从最大起重量插值
        assert!(approx_eq!(f64, capacity_at_radius(&spec, 4.0), 47_500.0, ulps = 4));
    }

    #[test]
    fn test_shortfall_reported() {
        let spec = at50();
        let check = check_capacity(&spec, 6.0, 50_000.0);
        assert!(!check.can_lift);
        assert!(approx_eq!(f64, check.shortfall, 10_000.0, epsilon = 1e-6));
        assert!(check.utilisation > 1.0);
    }

    #[test]
    fn test_check_lift_includes_rigging() {
        let spec = at50();
        let plan = LiftPlan {
            load_weight: 39_000.0,
            rigging_weight: 500.0,
            crane_base: Point2::new(0.0, 0.0),
            load_position: Point2::new(3.6, 4.8),
        };
        assert!(approx_eq!(f64, plan.radius(), 6.0, epsilon = 1e-12));
        let check = check_lift(&spec, &plan);
        assert!(check.can_lift);
        assert_eq!(check.hook_load, 39_500.0);
        assert_eq!(check.shortfall, 0.0);
    }

    #[test]
    fn test_exponential_fallback() {
        let mut spec = at50();
        spec.chart = None;
        let mid = capacity_at_radius(&spec, 21.5);
        // 半程衰减到 sqrt(0.03)
        assert!(approx_eq!(f64, mid, 50_000.0 * 0.03f64.sqrt(), epsilon = 1e-6));
        assert!(approx_eq!(f64, capacity_at_radius(&spec, 39.999_999), 1_500.0, epsilon = 0.01));
    }

    #[test]
    fn test_invalid_chart_rejected() {
        assert!(matches!(
            CapacityChart::from_pairs(&[(5.0, 100.0), (5.0, 90.0)]),
            Err(CoreError::DataIntegrity { .. })
        ));
        assert!(matches!(
            CapacityChart::from_pairs(&[(5.0, 100.0), (6.0, 120.0)]),
            Err(CoreError::DataIntegrity { .. })
        ));

        let mut spec = at50();
        spec.chart = Some(CapacityChart::from_pairs(&[(4.0, 60_000.0)]).unwrap());
        assert!(matches!(spec.validate(), Err(CoreError::DataIntegrity { .. })));
    }

    #[test]
    fn test_spec_from_json_validates() {
        let mut spec = at50();
        spec.max_radius = 2.0;
        let json = serde_json::to_string(&spec).unwrap();
        assert!(matches!(CraneSpec::from_json(&json), Err(CoreError::DataIntegrity { .. })));

        let json = serde_json::to_string(&at50()).unwrap();
        let loaded = CraneSpec::from_json(&json).unwrap();
        assert_eq!(loaded.model, "AT-50");
        assert_eq!(loaded.chart, at50().chart);
    }

    #[test]
    fn test_boom_tip() {
        let spec = at50();
        let tip = boom_tip(&spec, 0.0, 0.0);
        assert!(approx_eq!(f64, tip.x, 11.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, tip.z, 2.6, epsilon = 1e-12));

        let tip = boom_tip(&spec, 90.0, 1.0);
        assert!(approx_eq!(f64, tip.x, 0.8, epsilon = 1e-9));
        assert!(approx_eq!(f64, tip.z, 40.6, epsilon = 1e-9));

        // 伸出比例被截断
        assert_eq!(boom_tip(&spec, 30.0, 2.0), boom_tip(&spec, 30.0, 1.0));
        assert!(boom_radius(&spec, 60.0, 0.5) < boom_radius(&spec, 30.0, 0.5));
    }

    #[test]
    fn test_footprint_and_swing() {
        let spec = at50();
        let fp = outrigger_footprint(&spec, Point2::new(10.0, 0.0), 90.0);
        // 旋转 90° 后纵向沿 Y
        assert!((fp.pads[0] - Point2::new(7.0, 3.1)).norm() < 1e-9);
        assert!(approx_eq!(f64, fp.area(), 6.8 * 6.6, epsilon = 1e-9));
        assert!(approx_eq!(f64, counterweight_swing_radius(&spec), (16.0f64 + 1.44).sqrt(), epsilon = 1e-12));
    }

    #[test]
    fn test_crane_block() {
        let spec = at50();
        let block = crane_block(&spec, Placement::at(Point2::new(5.0, 5.0)), BoomPose::new(45.0, 0.5), LayerId(0)).unwrap();
        assert_eq!(block.name, "crane:AT-50");
        assert_eq!(block.children.len(), 12);
        let radius = boom_radius(&spec, 45.0, 0.5);
        match &block.children[11].kind {
            ElementKind::Circle { center, .. } => assert!(approx_eq!(f64, center.x, radius, epsilon = 1e-12)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_capacity_is_deterministic() {
        let spec = find_model("at-100").unwrap();
        assert_eq!(capacity_at_radius(&spec, 17.3), capacity_at_radius(&spec, 17.3));
    }

    proptest! {
        #[test]
        fn test_capacity_non_increasing(r1 in -5.0f64..70.0, dr in 0.0f64..30.0, chart in any::<bool>()) {
            let mut spec = find_model("AT-100").unwrap();
            if !chart {
                spec.chart = None;
            }
            let r2 = r1 + dr;
            prop_assert!(capacity_at_radius(&spec, r1) >= capacity_at_radius(&spec, r2));
        }
    }
}
