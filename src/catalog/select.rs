// src/catalog/select.rs
use std::cell::RefCell;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use super::{Scene, SceneSelector};
use crate::error::{NbrError, Result};

/// Picks the scene with the least cloud cover; the earliest listed wins ties
pub struct LowestCloudCover;

impl SceneSelector for LowestCloudCover {
    fn choose_scene(&self, candidates: &[Scene]) -> Result<usize> {
        if candidates.is_empty() {
            return Err(NbrError::NoScenes);
        }

        // Scenes without a cloud cover figure only win when nothing else is known
        Ok(candidates
            .iter()
            .enumerate()
            .filter(|(_, scene)| !scene.cloud_cover.is_nan())
            .min_by(|(_, a), (_, b)| a.cloud_cover.total_cmp(&b.cloud_cover))
            .map_or(0, |(i, _)| i))
    }
}

/// Always picks the scene at a fixed position
pub struct FixedIndex(pub usize);

impl SceneSelector for FixedIndex {
    fn choose_scene(&self, candidates: &[Scene]) -> Result<usize> {
        if candidates.is_empty() {
            return Err(NbrError::NoScenes);
        }
        if self.0 >= candidates.len() {
            return Err(NbrError::Selection(format!(
                "scene {} requested but only {} available",
                self.0,
                candidates.len()
            )));
        }
        Ok(self.0)
    }
}

/// Lists the candidates and asks for a choice until a valid index is entered
pub struct InteractiveSelector<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> InteractiveSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    pub fn into_output(self) -> W {
        self.output.into_inner()
    }
}

impl InteractiveSelector<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> SceneSelector for InteractiveSelector<R, W> {
    fn choose_scene(&self, candidates: &[Scene]) -> Result<usize> {
        if candidates.is_empty() {
            return Err(NbrError::NoScenes);
        }

        let mut input = self.input.borrow_mut();
        let mut output = self.output.borrow_mut();

        writeln!(output, "Available scenes:")?;
        for (i, scene) in candidates.iter().enumerate() {
            writeln!(output, "  Id: {i} - {scene}")?;
        }

        loop {
            write!(output, "Select a scene [0-{}]: ", candidates.len() - 1)?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Err(NbrError::Selection("no choice entered".to_string()));
            }

            match line.trim().parse::<usize>() {
                Ok(choice) if choice < candidates.len() => return Ok(choice),
                _ => writeln!(output, "Invalid choice: {}", line.trim())?,
            }
        }
    }
}
