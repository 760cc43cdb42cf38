mod builder;
mod document;
mod html;
mod layout;
mod markdown;
mod pages;
mod paginate;
mod paths;
pub mod pipeline;
mod post;
mod render;
mod tags;
mod templates;
mod truncate;
mod walk;

pub use builder::{BuildResult, Builder};
