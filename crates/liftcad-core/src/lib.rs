//! LiftCAD 核心
//!
//! 吊装平面图的精确绘图内核：几何图元、对象捕捉、图元/图层模型
//! 以及起重机吊臂和能力模型。
//!
//! # 架构设计
//!
//! - `geometry` / `intersection`: 纯函数的几何计算
//! - `entity` / `layer` / `drawing`: 图元模型，所有修改经事务提交
//! - `snap`: 在屏幕容差内选出最佳捕捉点
//! - `crane` / `block_library`: 起重机能力校核和符号块
//!
//! # 示例
//!
//! ```rust
//! use liftcad_core::prelude::*;
//!
//! let spec = liftcad_core::crane::find_model("AT-50").unwrap();
//! let check = check_capacity(&spec, 6.0, 50_000.0);
//! assert!(!check.can_lift);
//! ```

pub mod block_library;
pub mod crane;
pub mod drawing;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input_parser;
pub mod intersection;
pub mod layer;
pub mod math;
pub mod properties;
pub mod snap;
pub mod transform;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::block_library::{BlockDefinition, BlockItem, BlockLibrary, Placement};
    pub use crate::crane::{
        boom_radius, boom_tip, capacity_at_radius, check_capacity, check_lift, BoomPose, CapacityChart,
        CraneSpec, LiftCheck, LiftPlan,
    };
    pub use crate::drawing::{ChangeSet, CommitReceipt, Drawing, LayerDeletion, NewElement};
    pub use crate::entity::{BlockInstance, DrawingElement, ElementFamily, ElementId, ElementKind};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::geometry::{Arc, Circle, Geometry, Line, Proximity};
    pub use crate::input_parser::{InputParser, InputValue, ParseError};
    pub use crate::layer::{Layer, LayerId, LayerTable};
    pub use crate::math::{BoundingBox2, Point2, Point3, Vector2, Vector3};
    pub use crate::properties::{Color, LinePattern, Style};
    pub use crate::snap::{SnapEngine, SnapMask, SnapQuery, SnapResult, SnapSettings, SnapType};
    pub use crate::transform::Transform2D;
}
