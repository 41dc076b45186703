/// Terminal frontend: drives the demo scenes with an ASCII rasterizer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::debug;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod scene;
pub mod shooter;
pub mod showcase;
pub mod terrain;

pub use renderer::AsciiRenderer;
pub use scene::{FrameTime, Scene};
pub use shooter::ShooterScene;
pub use showcase::ShowcaseScene;
pub use terrain::TerrainScene;

/// Rows reserved for the status line
const STATUS_ROWS: u16 = 1;

/// Main application struct for terminal rendering
pub struct TerminalApp {
    scene: Box<dyn Scene>,
    renderer: AsciiRenderer,
    running: bool,
    started: Instant,
    last_update: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Box<dyn Scene>) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let now = Instant::now();

        Ok(Self {
            scene,
            renderer: AsciiRenderer::new(width as usize, height.saturating_sub(STATUS_ROWS) as usize),
            running: true,
            started: now,
            last_update: now,
            last_fps_sample: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }

            self.update();
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                other => self.scene.handle_key(other),
            },
            Event::Resize(width, height) => {
                debug!("terminal resized to {width}x{height}");
                self.renderer
                    .resize(width as usize, height.saturating_sub(STATUS_ROWS) as usize);
                execute!(stdout(), terminal::Clear(ClearType::All))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn update(&mut self) {
        let now = Instant::now();
        let time = FrameTime::new(
            (now - self.started).as_secs_f32(),
            (now - self.last_update).as_secs_f32(),
        );
        self.last_update = now;
        self.scene.update(time);
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.scene.render(&mut self.renderer);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, STATUS_ROWS))?;
        self.renderer.draw(&mut stdout)?;

        // Status line
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "FPS: {:.1} | {} | {}",
                self.fps,
                self.scene.status(),
                self.scene.controls()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
