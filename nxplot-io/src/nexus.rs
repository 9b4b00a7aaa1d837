//! NeXus `NXdata` attribute conventions.
//!
//! An `NXdata` group names its plottable dataset in the `signal` attribute
//! and its dimension scales in `axes`, one entry per signal dimension with
//! `"."` for dimensions without a scale. `<axis>_indices` attributes
//! override the dimension an axis belongs to.

use log::debug;
use nxplot_core::NxField;

/// Summary of one `NXdata` group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NxDataInfo {
    /// Group path inside the file, without the leading `/`.
    pub path: String,
    /// Name of the signal dataset.
    pub signal: Option<String>,
    /// Shape of the signal.
    pub shape: Vec<usize>,
    /// Axis dataset per signal dimension.
    pub axes: Vec<Option<String>>,
    /// Group title.
    pub title: Option<String>,
}

impl std::fmt::Display for NxDataInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} {:?}",
            self.path,
            self.signal.as_deref().unwrap_or("<no signal>"),
            self.shape
        )?;
        let axes: Vec<&str> = self
            .axes
            .iter()
            .map(|axis| axis.as_deref().unwrap_or("."))
            .collect();
        if !axes.is_empty() {
            write!(f, " axes=[{}]", axes.join(", "))?;
        }
        Ok(())
    }
}

/// Splits an `axes` attribute into names.
///
/// The attribute is either a string array or, in older files, a single
/// string separated by colons, commas or spaces (optionally bracketed).
pub fn parse_axes(values: &[String]) -> Vec<String> {
    match values {
        [single] => single
            .trim_matches(|c| c == '[' || c == ']')
            .split(|c: char| c == ':' || c == ',' || c.is_whitespace())
            .map(|name| name.trim_matches(|c| c == '\'' || c == '"'))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        many => many.iter().map(|name| name.trim().to_string()).collect(),
    }
}

/// Axis name for each of `rank` signal dimensions.
///
/// Names come positionally from `axes`; an `<axis>_indices` entry for a
/// listed axis moves it to the given dimension.
pub fn assign_axes(rank: usize, axes: &[String], indices: &[(String, usize)]) -> Vec<Option<String>> {
    let mut assigned: Vec<Option<String>> = vec![None; rank];
    for (slot, name) in assigned.iter_mut().zip(axes) {
        if !name.is_empty() && name != "." {
            *slot = Some(name.clone());
        }
    }
    for (name, dim) in indices {
        if *dim >= rank || !axes.contains(name) {
            continue;
        }
        for slot in &mut assigned {
            if slot.as_ref() == Some(name) {
                *slot = None;
            }
        }
        assigned[*dim] = Some(name.clone());
    }
    assigned
}

/// Fills dimensions without an axis with index axes.
///
/// Returns no axes when none was found, so the plot view synthesises them.
#[allow(clippy::cast_precision_loss)]
pub fn complete_axes(shape: &[usize], axes: Vec<Option<NxField>>) -> Vec<NxField> {
    if axes.iter().all(Option::is_none) {
        return Vec::new();
    }
    axes.into_iter()
        .zip(shape)
        .enumerate()
        .map(|(dim, (axis, &len))| {
            axis.unwrap_or_else(|| {
                debug!("no axis for dimension {dim}, using indices");
                NxField::from_vec(format!("Axis{dim}"), (0..len).map(|i| i as f64).collect())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_parse_axes() {
        assert_eq!(parse_axes(&names(&["x:y"])), names(&["x", "y"]));
        assert_eq!(parse_axes(&names(&["['x', 'y']"])), names(&["x", "y"]));
        assert_eq!(parse_axes(&names(&[".", " tof"])), names(&[".", "tof"]));
        assert!(parse_axes(&[]).is_empty());
    }

    #[test]
    fn test_assign_axes() {
        let axes = names(&[".", "x"]);
        assert_eq!(assign_axes(2, &axes, &[]), vec![None, Some("x".to_string())]);

        let moved = assign_axes(3, &names(&["y", "x"]), &[("x".to_string(), 2)]);
        assert_eq!(
            moved,
            vec![Some("y".to_string()), None, Some("x".to_string())]
        );

        let ignored = assign_axes(2, &names(&["x"]), &[("other".to_string(), 1)]);
        assert_eq!(ignored, vec![Some("x".to_string()), None]);
    }

    #[test]
    fn test_complete_axes() {
        assert!(complete_axes(&[2, 3], vec![None, None]).is_empty());
        let axes = complete_axes(&[2, 3], vec![None, Some(NxField::from_vec("x", vec![1.0, 2.0, 3.0]))]);
        assert_eq!(axes.len(), 2);
        assert_eq!(axes[0].name, "Axis0");
        assert_eq!(axes[0].to_vec(), vec![0.0, 1.0]);
        assert_eq!(axes[1].name, "x");
    }

    #[test]
    fn test_display() {
        let info = NxDataInfo {
            path: "entry/data".to_string(),
            signal: Some("counts".to_string()),
            shape: vec![2, 3],
            axes: vec![None, Some("x".to_string())],
            title: None,
        };
        assert_eq!(info.to_string(), "entry/data: counts [2, 3] axes=[., x]");
    }
}
