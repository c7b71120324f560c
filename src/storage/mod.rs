use std::path::{Path, PathBuf};

pub mod tabular;
pub use tabular::{read_table, write_table};

pub mod side_products;
pub use side_products::SideProducts;

/// `<dir>/<stem>[_<dataset>][_<step>].<ext>` for an output filename; the
/// extension defaults to `csv`.
pub fn output_path(
    dir: &Path,
    filename: &str,
    dataset: Option<usize>,
    step: Option<usize>,
) -> PathBuf {
    let file = Path::new(filename);
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let ext = file
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    let mut name = stem;
    if let Some(dataset) = dataset {
        name.push_str(&format!("_{}", dataset));
    }
    if let Some(step) = step {
        name.push_str(&format!("_{}", step));
    }
    let parent = file.parent().unwrap_or_else(|| Path::new(""));
    dir.join(parent).join(format!("{}.{}", name, ext))
}

/// Sibling of `path` named `<stem>_<suffix>.csv`.
pub fn companion_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}_{}.csv", stem, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names() {
        let dir = Path::new("out");
        assert_eq!(output_path(dir, "iris.csv", None, None), Path::new("out/iris.csv"));
        assert_eq!(output_path(dir, "iris.csv", Some(0), Some(3)), Path::new("out/iris_0_3.csv"));
        assert_eq!(output_path(dir, "iris", Some(2), None), Path::new("out/iris_2.csv"));
        assert_eq!(
            output_path(dir, "sub/iris.tsv", None, Some(1)),
            Path::new("out/sub/iris_1.tsv")
        );
    }

    #[test]
    fn companion_names() {
        let path = Path::new("out/iris_0_3.csv");
        assert_eq!(companion_path(path, "heatmap"), Path::new("out/iris_0_3_heatmap.csv"));
        assert_eq!(companion_path(path, "train"), Path::new("out/iris_0_3_train.csv"));
    }
}
