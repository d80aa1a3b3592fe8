/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Suffix a key must end with to be offered for download.
pub const ZIP_SUFFIX: &str = ".zip";

/// Keep only the keys ending in [`ZIP_SUFFIX`], preserving their order.
///
/// The match is case-sensitive and anchored at the end of the key.
pub fn filter_zip_objects<I, S>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter()
        .map(Into::into)
        .filter(|key| key.ends_with(ZIP_SUFFIX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_only_zip_in_order() {
        let keys = [
            "b.zip",
            "readme.txt",
            "a.zip",
            "nested/c.zip",
            "archive.zip.bak",
            "UPPER.ZIP",
            "zip",
            ".zip",
        ];
        assert_eq!(
            vec!["b.zip", "a.zip", "nested/c.zip", ".zip"],
            filter_zip_objects(keys)
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_zip_objects(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let keys = ["x.zip", "y.tar", "z.zip", "w.zipx"];
        let once = filter_zip_objects(keys);
        let twice = filter_zip_objects(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_random_keys_subset_and_order() {
        let suffixes = [".zip", ".ZIP", ".txt", "", ".zip/", "zip"];
        let keys: Vec<String> = (0..200)
            .map(|i| format!("k{i}{}", suffixes[fastrand::usize(..suffixes.len())]))
            .collect();

        let filtered = filter_zip_objects(keys.clone());
        let expected: Vec<String> = keys.into_iter().filter(|k| k.ends_with(".zip")).collect();
        assert_eq!(expected, filtered);
        assert_eq!(filtered, filter_zip_objects(filtered.clone()));
    }
}
