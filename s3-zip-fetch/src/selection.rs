/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Turn a requested filename or a typed list of indices into the files to download.
//!
//! Out-of-range indices are skipped and reported while the remaining indices still apply. A
//! token that is not an integer at all rejects the whole selection.

use std::num::IntErrorKind;

use crate::error::{self, Error};

/// Outcome of [`resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The files to download, without asking the user
    Selected(Vec<String>),

    /// More than one file matched and none was named; ask the user for indices and pass the
    /// answer to [`select_indices`]
    Prompt,
}

/// Resolve the files to download from the filtered listing.
///
/// An explicitly requested filename must be present in `files` exactly, otherwise an error of
/// kind [`NotFound`](crate::error::ErrorKind::NotFound) is returned. Without one, a sole match
/// is selected automatically.
pub fn resolve(files: &[String], requested: Option<&str>) -> Result<Resolution, Error> {
    match requested {
        Some(name) if files.iter().any(|f| f == name) => {
            Ok(Resolution::Selected(vec![name.to_owned()]))
        }
        Some(name) => Err(error::not_found(format!("File '{name}' not found"))),
        None if files.len() > 1 => Ok(Resolution::Prompt),
        None => Ok(Resolution::Selected(files.to_vec())),
    }
}

/// An index that parsed but does not point into the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedToken {
    token: String,
}

impl RejectedToken {
    /// The token as typed, without surrounding whitespace
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Files picked by [`select_indices`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Vec<String>,
    rejected: Vec<RejectedToken>,
}

impl Selection {
    /// Selected files in the order they were typed, duplicates included
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Consume the selection and return the selected files
    pub fn into_selected(self) -> Vec<String> {
        self.selected
    }

    /// Tokens that were skipped because they were out of range
    pub fn rejected(&self) -> &[RejectedToken] {
        &self.rejected
    }

    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// Select files by comma-separated, 1-based indices into `files`.
///
/// Returns an error of kind [`InputInvalid`](crate::error::ErrorKind::InputInvalid) if any token
/// is not an integer; no partial selection is made in that case. An empty result is not an
/// error.
pub fn select_indices(files: &[String], raw: &str) -> Result<Selection, Error> {
    let mut selection = Selection::default();

    for token in raw.trim().split(',') {
        let token = token.trim();
        let index = match token.parse::<i64>() {
            Ok(index) => Some(index),
            Err(err)
                if matches!(
                    err.kind(),
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                ) =>
            {
                None
            }
            Err(err) => {
                return Err(error::invalid_input(format!(
                    "'{token}' is not a number ({err}), enter comma-separated numbers"
                )))
            }
        };

        let file = index
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| files.get(index));

        match file {
            Some(file) => selection.selected.push(file.clone()),
            None => {
                tracing::debug!(token, "selection out of range, skipping");
                selection.rejected.push(RejectedToken {
                    token: token.to_owned(),
                })
            }
        }
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_explicit_filename_selected_without_prompt() {
        let files = files(&["a.zip", "b.zip", "c.zip"]);
        assert_eq!(
            Resolution::Selected(vec!["b.zip".to_owned()]),
            resolve(&files, Some("b.zip")).unwrap()
        );
    }

    #[test]
    fn test_explicit_filename_not_found() {
        let files = files(&["a.zip", "b.zip", "c.zip"]);
        let err = resolve(&files, Some("z.zip")).unwrap_err();
        assert_eq!(&ErrorKind::NotFound, err.kind());
    }

    #[test]
    fn test_explicit_filename_exact_match_only() {
        let files = files(&["dir/a.zip", "b.zip"]);
        assert!(resolve(&files, Some("a.zip")).is_err());
        assert!(resolve(&files, Some("B.zip")).is_err());
        assert!(resolve(&files, Some("b.zip ")).is_err());
    }

    #[test]
    fn test_single_match_auto_selected() {
        let files = files(&["only.zip"]);
        assert_eq!(
            Resolution::Selected(vec!["only.zip".to_owned()]),
            resolve(&files, None).unwrap()
        );
    }

    #[test]
    fn test_multiple_matches_prompt() {
        let files = files(&["a.zip", "b.zip"]);
        assert_eq!(Resolution::Prompt, resolve(&files, None).unwrap());
    }

    #[test]
    fn test_empty_listing_selects_nothing() {
        assert_eq!(Resolution::Selected(vec![]), resolve(&[], None).unwrap());
    }

    #[test]
    fn test_select_first_and_third() {
        let files = files(&["a.zip", "b.zip", "c.zip"]);
        let selection = select_indices(&files, "1,3").unwrap();
        assert_eq!(&["a.zip".to_owned(), "c.zip".to_owned()], selection.selected());
        assert!(selection.rejected().is_empty());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let files = files(&["a.zip", "b.zip", "c.zip"]);
        let selection = select_indices(&files, "  2 ,\t3 \n").unwrap();
        assert_eq!(&["b.zip".to_owned(), "c.zip".to_owned()], selection.selected());
    }

    #[test]
    fn test_non_numeric_token_aborts_whole_selection() {
        let files = files(&["a.zip", "b.zip", "c.zip"]);
        let err = select_indices(&files, "1,x,3").unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }

    #[test]
    fn test_empty_token_aborts_whole_selection() {
        let files = files(&["a.zip", "b.zip"]);
        assert!(select_indices(&files, "1,,2").is_err());
        assert!(select_indices(&files, "").is_err());
        assert!(select_indices(&files, "1.5").is_err());
    }

    #[test]
    fn test_out_of_range_skipped_silently() {
        let files = files(&["a.zip", "b.zip"]);
        let selection = select_indices(&files, "5").unwrap();
        assert!(selection.is_empty());
        assert_eq!("5", selection.rejected()[0].token());
    }

    #[test]
    fn test_out_of_range_does_not_block_valid_tokens() {
        let files = files(&["a.zip", "b.zip"]);
        let selection = select_indices(&files, "0, 2, -1, 3, 99999999999999999999999").unwrap();
        assert_eq!(&["b.zip".to_owned()], selection.selected());
        let rejected: Vec<&str> = selection.rejected().iter().map(|r| r.token()).collect();
        assert_eq!(vec!["0", "-1", "3", "99999999999999999999999"], rejected);
    }

    #[test]
    fn test_out_of_range_and_non_numeric_still_aborts() {
        let files = files(&["a.zip", "b.zip"]);
        let err = select_indices(&files, "5,abc").unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }

    #[test]
    fn test_duplicates_kept_in_typed_order() {
        let files = files(&["a.zip", "b.zip", "c.zip"]);
        let selection = select_indices(&files, "3,1,3").unwrap();
        assert_eq!(
            vec!["c.zip", "a.zip", "c.zip"],
            selection.into_selected()
        );
    }
}
