use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::{InputMode, Result, Stage};

/// One of the four mutually exclusive screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    Idle {
        /// Only shown once the player has scored at least once.
        max_score: Option<u32>,
        input: InputMode,
    },
    Playing {
        score: u32,
    },
    Ended {
        score: u32,
    },
    Celebrating,
}

impl View {
    pub fn lines(&self) -> Vec<String> {
        match self {
            View::Idle { max_score, input } => {
                let mut lines = Vec::new();
                if let Some(max_score) = max_score {
                    lines.push(format!("MAX SCORE: {max_score}"));
                }
                lines.push("Ping Pong Challenge!".to_string());
                lines.push(format!(
                    "Turn up the volume and {} your phone to start",
                    input.action_label()
                ));
                lines
            }
            View::Playing { score } => vec!["Score".to_string(), score.to_string()],
            View::Ended { score } => vec!["Game Over!".to_string(), format!("Score: {score}")],
            View::Celebrating => vec!["Are you a GOD?".to_string()],
        }
    }
}

/// Diagnostic overlay, present only in debug mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugOverlay {
    pub fps: u32,
    pub stage: Stage,
    pub score: u32,
}

impl DebugOverlay {
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("FPS: {}", self.fps),
            format!("Stage: {}", self.stage),
            format!("Score: {}", self.score),
        ]
    }
}

/// Everything the display needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub view: View,
    pub overlay: Option<DebugOverlay>,
}

/// Rendering collaborator; reads a [`Screen`] every frame.
pub trait Display {
    fn present(&mut self, screen: &Screen) -> Result<()>;
}

/// Line-oriented display that only redraws when the screen changes.
#[derive(Debug)]
pub struct TextDisplay<W: Write> {
    out: W,
    last: Option<Screen>,
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for TextDisplay<W> {
    fn present(&mut self, screen: &Screen) -> Result<()> {
        if self.last.as_ref() == Some(screen) {
            return Ok(());
        }

        writeln!(self.out, "----")?;
        for line in screen.view.lines() {
            writeln!(self.out, "{line}")?;
        }
        if let Some(overlay) = &screen.overlay {
            for line in overlay.lines() {
                writeln!(self.out, "  [{line}]")?;
            }
        }
        self.out.flush()?;

        self.last = Some(screen.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_hides_max_score_until_first_point() {
        let view = View::Idle {
            max_score: None,
            input: InputMode::Touch,
        };
        let lines = view.lines();
        assert!(!lines.iter().any(|line| line.contains("MAX SCORE")));
        assert!(lines.last().unwrap().contains("Touch your phone"));

        let view = View::Idle {
            max_score: Some(7),
            input: InputMode::Motion,
        };
        let lines = view.lines();
        assert_eq!(lines[0], "MAX SCORE: 7");
        assert!(lines.last().unwrap().contains("Swing your phone"));
    }

    #[test]
    fn screens_use_the_game_wording() {
        let idle = View::Idle {
            max_score: None,
            input: InputMode::Touch,
        };
        assert_eq!(idle.lines()[0], "Ping Pong Challenge!");
        assert_eq!(View::Playing { score: 4 }.lines(), vec!["Score", "4"]);
        assert_eq!(View::Ended { score: 4 }.lines(), vec!["Game Over!", "Score: 4"]);
        assert_eq!(View::Celebrating.lines(), vec!["Are you a GOD?"]);
    }

    #[test]
    fn redraws_only_on_change() {
        let mut display = TextDisplay::new(Vec::new());
        let playing = Screen {
            view: View::Playing { score: 3 },
            overlay: None,
        };
        display.present(&playing).unwrap();
        display.present(&playing).unwrap();
        display
            .present(&Screen {
                view: View::Ended { score: 3 },
                overlay: Some(DebugOverlay {
                    fps: 60,
                    stage: Stage::Ended,
                    score: 3,
                }),
            })
            .unwrap();

        let text = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(text.matches("----").count(), 2);
        assert!(text.contains("Game Over!"));
        assert!(text.contains("[Stage: ended]"));
        assert!(text.contains("[FPS: 60]"));
    }
}
