//! 具体的 Action 实现
//!
//! 每个绘图/编辑工具对应一个 Action 实现

mod draw_circle;
mod draw_line;
mod draw_rectangle;
mod measure_area;
mod measure_distance;
mod modify_array;
mod modify_join;
mod modify_mirror;
mod modify_offset;
mod modify_trim;
mod pan;

pub use draw_circle::DrawCircleAction;
pub use draw_line::DrawLineAction;
pub use draw_rectangle::DrawRectangleAction;
pub use measure_area::MeasureAreaAction;
pub use measure_distance::{measure, MeasureDistanceAction};
pub use modify_array::ArrayAction;
pub use modify_join::{join_chain, JoinAction};
pub use modify_mirror::MirrorAction;
pub use modify_offset::{offset_kind, OffsetAction};
pub use modify_trim::{split_arc, split_circle, split_line, TrimAction, TrimSplit};
pub use pan::PanAction;

use crate::action::{Action, ActionType};

/// 创建指定类型的 Action
pub fn create_action(action_type: ActionType) -> Box<dyn Action> {
    match action_type {
        ActionType::DrawLine => Box::new(DrawLineAction::new()),
        ActionType::DrawRectangle => Box::new(DrawRectangleAction::new()),
        ActionType::DrawCircle => Box::new(DrawCircleAction::new()),
        ActionType::Mirror => Box::new(MirrorAction::new()),
        ActionType::Trim => Box::new(TrimAction::new()),
        ActionType::Join => Box::new(JoinAction::new()),
        ActionType::Array => Box::new(ArrayAction::new()),
        ActionType::Offset => Box::new(OffsetAction::new()),
        ActionType::MeasureDistance => Box::new(MeasureDistanceAction::new()),
        ActionType::MeasureArea => Box::new(MeasureAreaAction::new()),
        ActionType::Pan => Box::new(PanAction::new()),
    }
}
