//! Reusable components.

pub mod joint_diagram;
