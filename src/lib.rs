//! Desktop front end for hexaphonic: the GL/imgui app and its panels.

pub mod app;
pub mod ui;
