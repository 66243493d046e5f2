use std::io::stdout;
use std::time::{Duration, Instant};

use color_eyre::eyre::WrapErr;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use lumen_background::{BackgroundState, CellMapping, HalfBlockView, HostEvent, Surface};
use lumen_config::Config;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::Paragraph,
};

mod logging;

/// Headline color (soft lavender).
const TITLE_COLOR: Color = Color::Rgb(220, 200, 255);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::load().wrap_err("failed to load configuration")?;
    // stderr is still ours until the terminal is taken over.
    if let Err(e) = logging::init(&config) {
        eprintln!("lumen: logging disabled: {e}");
    }
    log_config(&config);

    let terminal = ratatui::init();
    let result = execute!(stdout(), EnableMouseCapture)
        .wrap_err("failed to enable mouse capture")
        .and_then(|()| App::new(config).run(terminal));
    let _ = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}

/// Record the settings in effect once the subscriber is installed.
fn log_config(config: &Config) {
    match Config::default_path() {
        Ok(path) => tracing::info!(
            path = %path.display(),
            exists = path.exists(),
            frame_rate = config.frame_rate,
            cell_pixels = config.cell_pixels,
            seed = ?config.seed,
            "configuration loaded"
        ),
        Err(e) => tracing::warn!(error = %e, "no configuration directory, using defaults"),
    }
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// User settings.
    config: Config,
    /// Terminal cell to surface pixel mapping.
    mapping: CellMapping,
    /// Animated background; `None` until the terminal size is known.
    background: Option<BackgroundState<Surface>>,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        Self {
            running: false,
            mapping: CellMapping::new(config.cell_pixels),
            config,
            background: None,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let size = terminal.size()?;
        self.mount(size.width, size.height);
        self.running = true;

        let interval = self.config.frame_interval();
        while self.running {
            let frame_start = Instant::now();
            if let Some(background) = self.background.as_mut() {
                background.tick();
            }
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(frame_start + interval)?;
        }

        if let Some(background) = self.background.as_mut() {
            background.stop();
        }
        Ok(())
    }

    /// Create the background for a terminal of `columns` x `rows` cells.
    fn mount(&mut self, columns: u16, rows: u16) {
        let viewport = self.mapping.viewport(columns, rows);
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.background = Some(BackgroundState::mount(
            Some(Surface::default()),
            viewport,
            Box::new(rng),
        ));
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if let Some(surface) = self.background.as_ref().and_then(|b| b.canvas()) {
            frame.render_widget(HalfBlockView::new(surface, self.mapping), area);
        }

        // Create vertical layout for centering
        let chunks = Layout::vertical([
            Constraint::Fill(1),   // Top padding
            Constraint::Length(1), // Title
            Constraint::Length(1), // Spacing
            Constraint::Length(1), // Tagline
            Constraint::Fill(1),   // Bottom padding
            Constraint::Length(1), // Help text
        ])
        .split(area);

        let title = Paragraph::new(self.config.title.as_str())
            .style(Style::new().fg(TITLE_COLOR).bold())
            .alignment(Alignment::Center);
        frame.render_widget(title, chunks[1]);

        let tagline = Paragraph::new(self.config.tagline.as_str())
            .style(Style::new().fg(Color::Gray))
            .alignment(Alignment::Center);
        frame.render_widget(tagline, chunks[3]);

        if self.config.show_help {
            let help = Line::from(vec![
                "q".bold().fg(TITLE_COLOR),
                " quit  ".dark_gray(),
                "move the mouse".fg(TITLE_COLOR),
                " to stir the aurora".dark_gray(),
            ])
            .centered();
            frame.render_widget(help, chunks[5]);
        }
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Keeps polling until `deadline` so frames are paced evenly.
    fn handle_crossterm_events(&mut self, deadline: Instant) -> color_eyre::Result<()> {
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                return Ok(());
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::Resize(columns, rows) => self.on_resize(columns, rows),
                _ => {}
            }
            if !self.running || timeout == Duration::ZERO {
                return Ok(());
            }
        }
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            _ => {}
        }
    }

    /// Forwards pointer motion to the background.
    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Moved | MouseEventKind::Drag(_) = mouse.kind {
            let pointer = self.mapping.pointer(mouse.column, mouse.row);
            if let Some(background) = self.background.as_mut() {
                background.handle_event(HostEvent::PointerMove(pointer));
            }
        }
    }

    /// Forwards terminal size changes to the background.
    fn on_resize(&mut self, columns: u16, rows: u16) {
        let viewport = self.mapping.viewport(columns, rows);
        if let Some(background) = self.background.as_mut() {
            background.handle_event(HostEvent::Resize(viewport));
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use lumen_core::{Pointer, Viewport};

    use super::*;

    fn app() -> App {
        let mut app = App::new(Config {
            seed: Some(1),
            cell_pixels: 4,
            ..Config::default()
        });
        app.mount(40, 10);
        app
    }

    #[test]
    fn test_mount_uses_cell_mapping() {
        let app = app();
        let background = app.background.as_ref().unwrap();
        assert!(background.is_active());
        assert_eq!(background.viewport(), Viewport::new(160, 80));
    }

    #[test]
    fn test_mouse_move_updates_pointer() {
        let mut app = app();
        app.on_mouse_event(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 3,
            row: 2,
            modifiers: KeyModifiers::NONE,
        });
        let background = app.background.as_ref().unwrap();
        assert_eq!(background.pointer(), Pointer::new(14.0, 20.0));
    }

    #[test]
    fn test_resize_reaches_background() {
        let mut app = app();
        app.on_resize(100, 50);
        let background = app.background.as_ref().unwrap();
        assert_eq!(background.viewport(), Viewport::new(400, 400));
        assert_eq!(background.stars().len(), 20);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.running = true;
        app.on_key_event(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(app.running);
        app.on_key_event(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(!app.running);
    }
}
