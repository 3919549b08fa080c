//! App — the synchronous terminal shell around the playback controller.
//!
//! Everything runs on the main thread: poll for a terminal event, map it to
//! an `Action`, call the controller, redraw. The controller's observer and
//! the log feed only mark the view dirty.

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use radio_core::{PlaybackController, PlayerBackend};
use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info};

use crate::action::Action;
use crate::ui::{self, HitAreas, View};

const TICK: Duration = Duration::from_millis(250);

pub struct App<B: PlayerBackend> {
    controller: PlaybackController<B>,
    dirty: Rc<Cell<bool>>,
    status_rx: broadcast::Receiver<String>,
    last_status: Option<String>,
    compact: bool,
    should_quit: bool,
    hit_areas: HitAreas,
}

impl<B: PlayerBackend> App<B> {
    pub fn new(
        mut controller: PlaybackController<B>,
        status_rx: broadcast::Receiver<String>,
    ) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let flag = dirty.clone();
        controller.set_on_state_changed(move || flag.set(true));
        Self {
            controller,
            dirty,
            status_rx,
            last_status: None,
            compact: false,
            should_quit: false,
            hit_areas: HitAreas::default(),
        }
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        debug!("run(): terminal ready, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal);

        // ── Teardown ──────────────────────────────────────────────────────────
        self.controller.release();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("player exited");
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        while !self.should_quit {
            self.drain_status();
            if self.dirty.replace(false) {
                let compact = self.compact;
                let view = self.view();
                let mut areas = None;
                terminal.draw(|f| {
                    if compact {
                        ui::draw_compact(f, &view);
                    } else {
                        areas = Some(ui::draw(f, &view));
                    }
                })?;
                if let Some(areas) = areas {
                    self.hit_areas = areas;
                }
            }

            if !event::poll(TICK)? {
                continue;
            }
            let action = match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                Event::Resize(_, _) => {
                    self.dirty.set(true);
                    None
                }
                _ => None,
            };
            if let Some(action) = action {
                self.dispatch(action);
            }
        }
        Ok(())
    }

    fn view(&self) -> View<'_> {
        View {
            registry: self.controller.registry(),
            current_index: self.controller.current_index(),
            is_playing: self.controller.is_playing(),
            volume: self.controller.volume(),
            backend_ready: self.controller.has_backend(),
            status: self.last_status.as_deref(),
        }
    }

    fn drain_status(&mut self) {
        loop {
            match self.status_rx.try_recv() {
                Ok(msg) => {
                    self.last_status = Some(msg);
                    self.dirty.set(true);
                }
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }
        if self.compact {
            // Tray-style controls; anything else brings the window back.
            return match key.code {
                KeyCode::Char(' ') => Some(Action::TogglePause),
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                _ => Some(Action::Restore),
            };
        }
        match key.code {
            KeyCode::Char(' ') => Some(Action::TogglePause),
            KeyCode::Char('n') => Some(Action::Next),
            KeyCode::Char('p') => Some(Action::Prev),
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::VolumeUp),
            KeyCode::Left | KeyCode::Char('-') => Some(Action::VolumeDown),
            KeyCode::Char('m') => Some(Action::Minimize),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }

    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        if self.compact {
            return Some(Action::Restore);
        }
        self.hit_areas.action_at(mouse.column, mouse.row)
    }

    fn dispatch(&mut self, action: Action) {
        debug!("dispatch {:?}", action);
        match action {
            Action::TogglePause => self.controller.toggle_play_pause(),
            Action::Next => self.controller.next_station(),
            Action::Prev => self.controller.previous_station(),
            Action::Volume(_) | Action::VolumeUp | Action::VolumeDown => {
                let current = self.controller.volume();
                if let Some(volume) = action.target_volume(current) {
                    if volume != current {
                        self.controller.set_volume(volume);
                    }
                }
            }
            Action::Minimize => self.compact = true,
            Action::Restore => self.compact = false,
            Action::Quit => self.should_quit = true,
        }
        self.dirty.set(true);
    }
}
