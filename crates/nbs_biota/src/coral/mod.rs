// crates/nbs_biota/src/coral/mod.rs

//! 珊瑚模型
//!
//! [`Coral`] 保存群体形态与各过程的状态，过程按年依次执行：
//!
//! ```text
//! Light → Flow → Temperature → Photosynthesis → PopulationStates
//!       → Calcification → Morphology → (Dislodgement) → Recruitment
//! ```

pub mod calcification;
pub mod dislodgement;
pub mod flow;
pub mod light;
pub mod model;
pub mod morphology;
pub mod output;
pub mod photosynthesis;
pub mod population_states;
pub mod recruitment;
pub mod temperature;

pub use calcification::Calcification;
pub use dislodgement::Dislodgement;
pub use flow::Flow;
pub use light::Light;
pub use model::{Coral, CoralMorphology, NUM_POP_STATES};
pub use morphology::Morphology;
pub use output::CoralOutputGroup;
pub use photosynthesis::Photosynthesis;
pub use population_states::PopulationStates;
pub use recruitment::Recruitment;
pub use temperature::Temperature;
