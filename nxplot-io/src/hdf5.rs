//! `NXdata` groups in NeXus/HDF5 files.

use crate::nexus::{assign_axes, complete_axes, parse_axes, NxDataInfo};
use crate::{Error, Result};
use hdf5::types::{VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File, Group, Location};
use log::{debug, info};
use ndarray::ArrayView1;
use nxplot_core::{NxData, NxField};
use std::path::Path;
use std::str::FromStr;

/// Lists every `NXdata` group in a file, depth first.
///
/// # Errors
/// Returns an error if the file cannot be opened or walked.
pub fn list_nxdata<P: AsRef<Path>>(path: P) -> Result<Vec<NxDataInfo>> {
    let file = File::open(path)?;
    let mut found = Vec::new();
    walk(&file, &mut found)?;
    Ok(found)
}

fn walk(group: &Group, found: &mut Vec<NxDataInfo>) -> Result<()> {
    for child in group.groups()? {
        if read_attr_string(&child, "NX_class")?.as_deref() == Some("NXdata") {
            found.push(describe(&child)?);
        }
        walk(&child, found)?;
    }
    Ok(())
}

fn describe(group: &Group) -> Result<NxDataInfo> {
    let path = group.name().trim_start_matches('/').to_string();
    let Some(signal) = find_signal(group)? else {
        return Ok(NxDataInfo {
            path,
            ..NxDataInfo::default()
        });
    };
    let shape = group.dataset(&signal)?.shape();
    let axes = axis_names(group, &signal, shape.len())?;
    Ok(NxDataInfo {
        path,
        signal: Some(signal),
        shape,
        axes,
        title: read_title(group),
    })
}

/// Reads the `NXdata` group at `group` (e.g. `"entry/data"`).
///
/// # Errors
/// `Core(NoSignal)` when the group names no signal; `InvalidFormat` for
/// multi-dimensional axes; HDF5 errors; validation errors of the result.
pub fn read_nxdata<P: AsRef<Path>>(path: P, group: &str) -> Result<NxData> {
    let file = File::open(path.as_ref())?;
    let group = file.group(group)?;
    let signal_name = find_signal(&group)?.ok_or(nxplot_core::Error::NoSignal)?;
    let dataset = group.dataset(&signal_name)?;
    let signal = read_field(&dataset, &signal_name)?;
    let shape = signal.shape().to_vec();

    let axes = axis_names(&group, &signal_name, shape.len())?
        .into_iter()
        .map(|name| name.map(|name| read_axis(&group, &name)).transpose())
        .collect::<Result<Vec<_>>>()?;
    let axes = complete_axes(&shape, axes);

    let errors = ["errors".to_string(), format!("{signal_name}_errors")]
        .iter()
        .find(|name| group.link_exists(name))
        .map(|name| group.dataset(name).and_then(|ds| ds.read_dyn::<f64>()))
        .transpose()?;

    let name = group
        .name()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    let mut data = NxData::new(signal).with_name(name).with_axes(axes);
    data.errors = errors;
    data.title = read_title(&group);
    data.validate()?;
    info!(
        "Read {} {:?} from {}",
        group.name(),
        data.shape(),
        path.as_ref().display()
    );
    Ok(data)
}

/// Writes `data` as an `NXdata` group at `group`, creating the file and
/// any parent groups as needed. The first path component is an `NXentry`.
///
/// # Errors
/// `InvalidFormat` when the group already exists; validation errors of
/// `data`; HDF5 errors.
pub fn write_nxdata<P: AsRef<Path>>(path: P, group: &str, data: &NxData) -> Result<()> {
    data.validate()?;
    let signal = data.signal()?;
    let path = path.as_ref();
    let file = match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => File::append(path)?,
        _ => File::create(path)?,
    };

    let components: Vec<&str> = group.split('/').filter(|c| !c.is_empty()).collect();
    let Some((leaf, parents)) = components.split_last() else {
        return Err(Error::InvalidFormat("empty group path".to_string()));
    };
    let mut parent: Group = file.group("/")?;
    for (depth, name) in parents.iter().enumerate() {
        parent = if parent.link_exists(name) {
            parent.group(name)?
        } else {
            let created = parent.create_group(name)?;
            let class = if depth == 0 { "NXentry" } else { "NXsubentry" };
            set_attr_str(&created, "NX_class", class)?;
            created
        };
    }
    if parent.link_exists(leaf) {
        return Err(Error::InvalidFormat(format!("group {group} already exists")));
    }

    let nxdata = parent.create_group(leaf)?;
    set_attr_str(&nxdata, "NX_class", "NXdata")?;
    set_attr_str(&nxdata, "signal", &signal.name)?;
    if let Some(title) = &data.title {
        set_attr_str(&nxdata, "title", title)?;
    }
    write_field(&nxdata, signal)?;

    if !data.axes.is_empty() {
        let names: Vec<&str> = data.axes.iter().map(|axis| axis.name.as_str()).collect();
        set_axes_attr(&nxdata, &names)?;
        for (dim, axis) in data.axes.iter().enumerate() {
            write_field(&nxdata, axis)?;
            set_axis_indices(&nxdata, &axis.name, dim)?;
        }
    }
    if let Some(errors) = &data.errors {
        let dataset = nxdata
            .new_dataset::<f64>()
            .shape(errors.shape().to_vec())
            .create("errors")?;
        dataset.write(errors.view())?;
    }
    debug!("wrote {group} with shape {:?}", data.shape());
    Ok(())
}

fn find_signal(group: &Group) -> Result<Option<String>> {
    if let Some(signal) = read_attr_string(group, "signal")? {
        if group.link_exists(&signal) {
            return Ok(Some(signal));
        }
    }
    // older files flag the signal dataset with signal=1
    for dataset in group.datasets()? {
        if let Ok(attr) = dataset.attr("signal") {
            if attr.read_scalar::<i32>().ok() == Some(1) {
                let name = dataset.name();
                let name = name.rsplit('/').next().unwrap_or_default();
                return Ok(Some(name.to_string()));
            }
        }
    }
    Ok(None)
}

fn axis_names(group: &Group, signal: &str, rank: usize) -> Result<Vec<Option<String>>> {
    let listed = match read_attr_strings(group, "axes")? {
        Some(values) => values,
        None => read_attr_strings(&group.dataset(signal)?, "axes")?.unwrap_or_default(),
    };
    let axes = parse_axes(&listed);
    let mut indices = Vec::new();
    for name in &axes {
        if let Ok(attr) = group.attr(&format!("{name}_indices")) {
            if let Some(&dim) = attr.read_raw::<i64>()?.first() {
                if let Ok(dim) = usize::try_from(dim) {
                    indices.push((name.clone(), dim));
                }
            }
        }
    }
    let axes: Vec<String> = axes
        .into_iter()
        .map(|name| {
            if name == "." || group.link_exists(&name) {
                name
            } else {
                debug!("axis {name} listed but missing");
                ".".to_string()
            }
        })
        .collect();
    Ok(assign_axes(rank, &axes, &indices))
}

fn read_axis(group: &Group, name: &str) -> Result<NxField> {
    let dataset = group.dataset(name)?;
    if dataset.ndim() > 1 {
        return Err(Error::InvalidFormat(format!(
            "axis {name} has shape {:?}",
            dataset.shape()
        )));
    }
    let field = read_field(&dataset, name)?;
    let values = field
        .values
        .into_shape_with_order(dataset.size())
        .map_err(|e| Error::InvalidFormat(format!("axis {name}: {e}")))?
        .into_dyn();
    Ok(NxField { values, ..field })
}

fn read_field(dataset: &Dataset, name: &str) -> Result<NxField> {
    let mut field = NxField::new(name, dataset.read_dyn::<f64>()?);
    field.long_name = read_attr_string(dataset, "long_name")?;
    field.units = read_attr_string(dataset, "units")?;
    Ok(field)
}

fn write_field(group: &Group, field: &NxField) -> Result<()> {
    let dataset = group
        .new_dataset::<f64>()
        .shape(field.values.shape().to_vec())
        .create(field.name.as_str())?;
    dataset.write(field.values.view())?;
    if let Some(long_name) = &field.long_name {
        set_attr_str(&dataset, "long_name", long_name)?;
    }
    if let Some(units) = &field.units {
        set_attr_str(&dataset, "units", units)?;
    }
    Ok(())
}

fn read_title(group: &Group) -> Option<String> {
    if let Ok(Some(title)) = read_attr_string(group, "title") {
        return Some(title);
    }
    let dataset = group.dataset("title").ok()?;
    dataset
        .read_scalar::<VarLenUnicode>()
        .map(|title| title.to_string())
        .ok()
}

fn set_axes_attr(group: &Group, axes: &[&str]) -> Result<()> {
    let values: Vec<VarLenUnicode> = axes
        .iter()
        .map(|axis| to_var_len_unicode(axis))
        .collect::<Result<Vec<_>>>()?;
    let attr = group
        .new_attr::<VarLenUnicode>()
        .shape((values.len(),))
        .create("axes")?;
    attr.write(ArrayView1::from(values.as_slice()))?;
    Ok(())
}

fn set_axis_indices(group: &Group, name: &str, index: usize) -> Result<()> {
    let attr_name = format!("{name}_indices");
    let index = i32::try_from(index)
        .map_err(|_| Error::InvalidFormat(format!("axis index {index} out of range")))?;
    group
        .new_attr::<i32>()
        .create(attr_name.as_str())?
        .write_scalar(&index)?;
    Ok(())
}

fn set_attr_str(location: &Location, name: &str, value: &str) -> Result<()> {
    let value = to_var_len_unicode(value)?;
    location
        .new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn read_attr_string(location: &Location, name: &str) -> Result<Option<String>> {
    Ok(read_attr_strings(location, name)?.and_then(|values| values.into_iter().next()))
}

/// String attribute as a list, whether stored as a scalar or an array of
/// UTF-8 or ASCII strings.
fn read_attr_strings(location: &Location, name: &str) -> Result<Option<Vec<String>>> {
    let Ok(attr) = location.attr(name) else {
        return Ok(None);
    };
    let values = if attr.is_scalar() {
        match attr.read_scalar::<VarLenUnicode>() {
            Ok(value) => vec![value.to_string()],
            Err(_) => vec![attr.read_scalar::<VarLenAscii>()?.to_string()],
        }
    } else {
        match attr.read_raw::<VarLenUnicode>() {
            Ok(values) => values.iter().map(ToString::to_string).collect(),
            Err(_) => attr
                .read_raw::<VarLenAscii>()?
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    };
    Ok(Some(values))
}

fn to_var_len_unicode(value: &str) -> Result<VarLenUnicode> {
    VarLenUnicode::from_str(value)
        .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array, IxDyn};
    use tempfile::NamedTempFile;

    fn sample() -> NxData {
        let values = Array::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        NxData::new(NxField::new("counts", values).with_units("counts"))
            .with_axes(vec![
                NxField::from_vec("y", vec![0.0, 1.0]),
                NxField::from_vec("x", vec![10.0, 20.0, 30.0, 40.0]).with_units("mm"),
            ])
            .with_errors(Array::from_elem(IxDyn(&[2, 3]), 0.5))
            .with_title("sample scan")
    }

    #[test]
    fn test_nxdata_roundtrip() {
        let file = NamedTempFile::new().unwrap();
        write_nxdata(file.path(), "entry/data", &sample()).unwrap();

        let data = read_nxdata(file.path(), "entry/data").unwrap();
        assert_eq!(data.name, "data");
        assert_eq!(data.shape(), &[2, 3]);
        assert_eq!(data.title.as_deref(), Some("sample scan"));
        assert_eq!(data.axes.len(), 2);
        assert_eq!(data.axes[1].name, "x");
        assert_eq!(data.axes[1].units.as_deref(), Some("mm"));
        assert_eq!(data.axes[1].to_vec().len(), 4);
        let signal = data.signal().unwrap();
        assert_relative_eq!(signal.values[[1, 2]], 6.0);
        assert_relative_eq!(data.errors.unwrap()[[0, 0]], 0.5);
    }

    #[test]
    fn test_list_nxdata() {
        let file = NamedTempFile::new().unwrap();
        write_nxdata(file.path(), "entry/data", &sample()).unwrap();
        let line = NxData::new(NxField::from_vec("y", vec![1.0, 2.0, 3.0]));
        write_nxdata(file.path(), "entry/fit/line", &line).unwrap();

        let found = list_nxdata(file.path()).unwrap();
        let paths: Vec<&str> = found.iter().map(|info| info.path.as_str()).collect();
        assert_eq!(paths, vec!["entry/data", "entry/fit/line"]);
        assert_eq!(found[0].axes, vec![Some("y".to_string()), Some("x".to_string())]);
        assert_eq!(found[1].shape, vec![3]);
        assert!(found[1].axes.iter().all(Option::is_none));
    }

    #[test]
    fn test_existing_group_rejected() {
        let file = NamedTempFile::new().unwrap();
        write_nxdata(file.path(), "entry/data", &sample()).unwrap();
        let err = write_nxdata(file.path(), "entry/data", &sample()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_signal() {
        let file = NamedTempFile::new().unwrap();
        {
            let h5 = File::create(file.path()).unwrap();
            let group = h5.create_group("entry").unwrap();
            set_attr_str(&group, "NX_class", "NXdata").unwrap();
        }
        let err = read_nxdata(file.path(), "entry").unwrap_err();
        assert!(matches!(err, Error::Core(nxplot_core::Error::NoSignal)));
        let found = list_nxdata(file.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].signal.is_none());
    }
}
