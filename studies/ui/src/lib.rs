use color_eyre::Result;

use crate::ui::App;

pub mod ui;
pub mod state;
pub mod editor;

/// Takes over the terminal until the operator quits.
pub fn launch(app: App) -> Result<()> {
    let terminal = ratatui::init();
    let app_result = app.run(terminal);
    ratatui::restore();
    app_result
}
