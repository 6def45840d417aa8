//! Admin Instructions for the Obscura privacy pool

pub mod pause;
pub mod unpause;
