// src/main.rs — activity signup page (Rust + Yew + WASM)
// Session bootstrap, the activity list, teacher login and signup/unregister
// against the school's activities API.

mod api;
mod app;
mod catalog;
mod config;
mod dispatch;
mod error;
mod session;
#[cfg(test)]
mod testing;

fn main() {
    yew::Renderer::<app::App>::new().render();
}
