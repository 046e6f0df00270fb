// Line-level annotation: parse a query line, predict, disambiguate, render.

use crate::dictionary::Dictionary;
use crate::disambiguate::disambiguate;
use crate::index::Indices;
use crate::inference::InferenceEngine;
use crate::output::join_candidates;
use crate::postedit::PostEditor;
use crate::types::{Annotation, CandidateSet, Columns, ABSENT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Snap synthesized glosses onto the nearest known gloss.
    pub post_edit: bool,
}

/// The form queried by `line`, or `None` if the line passes through untouched.
///
/// Comment lines (leading `#`) and blank lines pass through. Otherwise the form
/// is everything before the first whitespace or `#`, which may be empty.
pub fn query_form(line: &str) -> Option<&str> {
    if line.starts_with('#') || line.trim().is_empty() {
        return None;
    }
    let end = line
        .find(|c: char| c == '#' || c.is_whitespace())
        .unwrap_or(line.len());
    Some(&line[..end])
}

/// Annotates query lines against a fixed dictionary and its indices.
pub struct Pipeline<'a> {
    engine: InferenceEngine<'a>,
    post_editor: Option<PostEditor<'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(dictionary: &'a Dictionary, indices: &'a Indices, options: PipelineOptions) -> Self {
        let post_editor = options
            .post_edit
            .then(|| PostEditor::new(&indices.glosses));
        Self {
            engine: InferenceEngine::new(dictionary, indices),
            post_editor,
        }
    }

    pub fn engine(&self) -> &InferenceEngine<'a> {
        &self.engine
    }

    pub fn post_editor(&self) -> Option<&PostEditor<'a>> {
        self.post_editor.as_ref()
    }

    /// Annotate one query line.
    pub fn annotate(&mut self, line: &str) -> Annotation {
        let line = line.trim_end();
        let Some(form) = query_form(line) else {
            return Annotation {
                line: line.to_string(),
                form: None,
                columns: None,
            };
        };

        let columns = if form.is_empty() {
            Columns::absent()
        } else {
            self.columns(form)
        };
        Annotation {
            line: line.to_string(),
            form: Some(form.to_string()),
            columns: Some(columns),
        }
    }

    fn columns(&mut self, form: &str) -> Columns {
        let prediction = self.engine.predict(form);
        let base = self
            .engine
            .dictionary()
            .first_gloss(form)
            .unwrap_or(ABSENT)
            .to_string();

        let mut columns = Columns {
            base,
            code: prediction.code.to_string(),
            previous: self.render(&prediction.previous),
            left: self.render(&prediction.left),
            right: self.render(&prediction.right),
            merged: self.render(&prediction.merged),
        };

        if let Some(editor) = self.post_editor.as_mut() {
            for field in [
                &mut columns.previous,
                &mut columns.left,
                &mut columns.right,
                &mut columns.merged,
            ] {
                *field = editor.correct(field.as_str());
            }
        }
        columns
    }

    fn render(&self, candidates: &CandidateSet) -> String {
        join_candidates(&disambiguate(candidates, &self.engine.indices().glosses))
    }
}
