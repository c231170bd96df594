//! MATLAB v7.3 session containers (HDF5).
//!
//! Session fields live in the `data` struct group. MATLAB writes arrays
//! column-major, so every matrix comes back from HDF5 transposed and is
//! flipped to neuron-major layout here. Contours are a cell array: `Coor`
//! holds one object reference per neuron, each pointing at a K × 2 dataset
//! under `#refs#`.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use civis_core::{RawSession, Session, TraceKind};
use hdf5::types::VarLenUnicode;
use hdf5::{Dataset, File, Group, ObjectReference1, ReferencedObject};
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView2};

use crate::{Error, Result};

/// Struct group holding every session field.
pub const DATA_GROUP: &str = "data";
/// Reference image field.
pub const IMAGE_FIELD: &str = "Cn";
/// One-based neuron id vector.
pub const IDS_FIELD: &str = "ids";
/// Contour cell array (object references).
pub const CONTOURS_FIELD: &str = "Coor";
/// Optional N × 2 centroid matrix.
pub const CENTROIDS_FIELD: &str = "centroids";
/// UTF-16 metadata path.
pub const METADATA_FIELD: &str = "virmenPath";

const REFS_GROUP: &str = "#refs#";
const MATLAB_CLASS_ATTR: &str = "MATLAB_class";
const MATLAB_EMPTY_ATTR: &str = "MATLAB_empty";

/// Reads a session container and assembles a [`Session`].
///
/// # Errors
/// Returns [`Error::Io`] if `path` is unreadable, [`Error::MissingField`]
/// if a required field is absent and [`Error::InvalidFormat`] if the file
/// is not a container or its dimensions disagree.
pub fn load_session<P: AsRef<Path>>(path: P) -> Result<Session> {
    let path = path.as_ref();
    let raw = read_raw_session(path)?;
    let session = raw.into_session().map_err(|e| match e {
        civis_core::Error::Inconsistent(msg) => {
            Error::InvalidFormat(format!("{}: {msg}", path.display()))
        }
        other => Error::Core(other),
    })?;

    info!(
        "loaded {}: {} neurons, {}x{} image, {} timepoints",
        path.display(),
        session.neuron_count(),
        session.height(),
        session.width(),
        session.traces().timepoints()
    );
    Ok(session)
}

/// Reads every session field, transposed to consumption layout but
/// otherwise untouched (ids still one-based, contours in image coordinates).
///
/// # Errors
/// See [`load_session`].
pub fn read_raw_session<P: AsRef<Path>>(path: P) -> Result<RawSession> {
    let path = path.as_ref();
    // Unreadable paths surface as plain I/O errors before HDF5 sees them.
    std::fs::File::open(path)?;
    let file = File::open(path).map_err(|e| {
        Error::InvalidFormat(format!("{} is not an HDF5 container: {e}", path.display()))
    })?;
    if !file.link_exists(DATA_GROUP) {
        return Err(Error::MissingField(DATA_GROUP.to_string()));
    }
    let data = file.group(DATA_GROUP)?;

    let image = read_matrix(&data, IMAGE_FIELD)?;

    let mut traces = BTreeMap::new();
    for kind in TraceKind::ALL {
        let name = kind.field_name();
        if data.link_exists(name) {
            traces.insert(kind, read_matrix(&data, name)?);
        } else if kind.is_required() {
            return Err(Error::MissingField(name.to_string()));
        }
    }

    let ids = required_dataset(&data, IDS_FIELD)?;
    let ids = if is_matlab_empty(&ids)? {
        Vec::new()
    } else {
        ids.read_raw::<f64>()?
    };
    let contours = read_contours(&file, &data)?;
    let centroids = if data.link_exists(CENTROIDS_FIELD) {
        Some(read_matrix(&data, CENTROIDS_FIELD)?).filter(|c| !c.is_empty())
    } else {
        None
    };
    let metadata_path = read_utf16(&data, METADATA_FIELD)?;

    debug!(
        "{}: {} ids, {} contours, {} trace kinds",
        path.display(),
        ids.len(),
        contours.len(),
        traces.len()
    );
    Ok(RawSession {
        image,
        contours,
        traces,
        ids,
        centroids,
        metadata_path,
    })
}

/// Writes `raw` in the container layout [`read_raw_session`] expects.
///
/// Used for fixtures and synthetic demo sessions.
///
/// # Errors
/// Returns an error if the file or any dataset cannot be created.
pub fn write_session_container<P: AsRef<Path>>(path: P, raw: &RawSession) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let data = file.create_group(DATA_GROUP)?;
    set_matlab_class(&data, "struct")?;

    write_matrix(&data, IMAGE_FIELD, raw.image.view())?;
    for (kind, matrix) in &raw.traces {
        write_matrix(&data, kind.field_name(), matrix.view())?;
    }

    if raw.ids.is_empty() {
        write_empty(&data, IDS_FIELD, "double")?;
    } else {
        let ids = Array2::from_shape_vec((raw.ids.len(), 1), raw.ids.clone())
            .map_err(|e| Error::InvalidFormat(format!("id vector: {e}")))?;
        write_stored(&data, IDS_FIELD, &ids.view(), "double")?;
    }

    if let Some(centroids) = &raw.centroids {
        write_matrix(&data, CENTROIDS_FIELD, centroids.view())?;
    }

    if raw.contours.is_empty() {
        write_empty(&data, CONTOURS_FIELD, "cell")?;
    } else {
        write_contours(&file, &data, &raw.contours)?;
    }

    if raw.metadata_path.is_empty() {
        write_empty(&data, METADATA_FIELD, "char")?;
    } else {
        let units: Vec<u16> = raw.metadata_path.encode_utf16().collect();
        let units = Array2::from_shape_vec((units.len(), 1), units)
            .map_err(|e| Error::InvalidFormat(format!("metadata path: {e}")))?;
        write_stored(&data, METADATA_FIELD, &units.view(), "char")?;
    }

    debug!("wrote {} neurons to {}", raw.ids.len(), path.display());
    Ok(())
}

fn write_contours(file: &File, data: &Group, contours: &[Array2<f64>]) -> Result<()> {
    let refs_group = file.create_group(REFS_GROUP)?;
    let mut references = Vec::with_capacity(contours.len());
    for (i, coords) in contours.iter().enumerate() {
        let name = format!("c{i}");
        if coords.is_empty() {
            write_empty(&refs_group, &name, "double")?;
        } else {
            write_matrix(&refs_group, &name, coords.view())?;
        }
        references.push(refs_group.reference::<ObjectReference1>(&name)?);
    }
    let cells = Array2::from_shape_vec((1, references.len()), references)
        .map_err(|e| Error::InvalidFormat(format!("contour cell array: {e}")))?;
    let coor = data
        .new_dataset_builder()
        .with_data(&cells)
        .create(CONTOURS_FIELD)?;
    set_matlab_class(&coor, "cell")
}

fn required_dataset(group: &Group, name: &str) -> Result<Dataset> {
    if !group.link_exists(name) {
        return Err(Error::MissingField(name.to_string()));
    }
    Ok(group.dataset(name)?)
}

fn read_matrix(group: &Group, name: &str) -> Result<Array2<f64>> {
    let dataset = required_dataset(group, name)?;
    if is_matlab_empty(&dataset)? {
        return Ok(Array2::zeros((0, 0)));
    }
    read_transposed(&dataset, name)
}

fn read_transposed(dataset: &Dataset, name: &str) -> Result<Array2<f64>> {
    if dataset.ndim() != 2 {
        return Err(Error::InvalidFormat(format!(
            "field '{name}' has {} dimensions, expected 2",
            dataset.ndim()
        )));
    }
    let stored = dataset.read_2d::<f64>()?;
    Ok(stored.reversed_axes().as_standard_layout().into_owned())
}

fn read_contours(file: &File, data: &Group) -> Result<Vec<Array2<f64>>> {
    let cells = required_dataset(data, CONTOURS_FIELD)?;
    if is_matlab_empty(&cells)? {
        return Ok(Vec::new());
    }
    let references = cells.read_raw::<ObjectReference1>()?;
    references
        .iter()
        .enumerate()
        .map(|(i, reference)| match file.dereference(reference)? {
            ReferencedObject::Dataset(dataset) => {
                if is_matlab_empty(&dataset)? {
                    return Ok(Array2::zeros((2, 0)));
                }
                read_transposed(&dataset, &format!("{CONTOURS_FIELD}[{i}]"))
            }
            _ => Err(Error::InvalidFormat(format!(
                "{CONTOURS_FIELD}[{i}] does not reference a dataset"
            ))),
        })
        .collect()
}

fn read_utf16(group: &Group, name: &str) -> Result<String> {
    let dataset = required_dataset(group, name)?;
    if is_matlab_empty(&dataset)? {
        return Ok(String::new());
    }
    let units = dataset.read_raw::<u16>()?;
    String::from_utf16(&units)
        .map_err(|e| Error::InvalidFormat(format!("field '{name}' is not UTF-16 text: {e}")))
}

fn is_matlab_empty(dataset: &Dataset) -> Result<bool> {
    Ok(dataset
        .attr_names()?
        .iter()
        .any(|attr| attr == MATLAB_EMPTY_ATTR))
}

fn write_matrix(group: &Group, name: &str, matrix: ArrayView2<'_, f64>) -> Result<()> {
    if matrix.is_empty() {
        return write_empty(group, name, "double");
    }
    let stored = matrix.t().as_standard_layout().into_owned();
    write_stored(group, name, &stored.view(), "double")
}

fn write_stored<T: hdf5::H5Type>(
    group: &Group,
    name: &str,
    stored: &ArrayView2<'_, T>,
    class: &str,
) -> Result<()> {
    let dataset = group.new_dataset_builder().with_data(stored).create(name)?;
    set_matlab_class(&dataset, class)
}

fn write_empty(group: &Group, name: &str, class: &str) -> Result<()> {
    // MATLAB stores empty arrays as their dimension vector.
    let dims = Array1::from(vec![0_u64, 0]);
    let dataset = group.new_dataset_builder().with_data(&dims).create(name)?;
    set_matlab_class(&dataset, class)?;
    dataset
        .new_attr::<u8>()
        .create(MATLAB_EMPTY_ATTR)?
        .write_scalar(&1_u8)?;
    Ok(())
}

fn set_matlab_class(location: &hdf5::Location, class: &str) -> Result<()> {
    let value = VarLenUnicode::from_str(class)
        .map_err(|e| Error::InvalidFormat(format!("invalid class name: {e}")))?;
    location
        .new_attr::<VarLenUnicode>()
        .create(MATLAB_CLASS_ATTR)?
        .write_scalar(&value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use tempfile::NamedTempFile;

    fn diagonal_raw() -> RawSession {
        let traces = TraceKind::ALL
            .iter()
            .filter(|kind| kind.is_required())
            .map(|&kind| (kind, array![[0.0, 1.0, 2.0, 3.0]]))
            .collect();
        RawSession {
            image: array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
            contours: vec![array![[0.0, 1.0, 2.0], [0.0, 1.0, 2.0]]],
            traces,
            ids: vec![1.0],
            centroids: None,
            metadata_path: String::from("D:\\virmen\\M12\\run_ü.mat"),
        }
    }

    #[test]
    fn test_matrices_are_stored_transposed() {
        let file = NamedTempFile::new().unwrap();
        let raw = diagonal_raw();
        write_session_container(file.path(), &raw).unwrap();

        let h5 = File::open(file.path()).unwrap();
        let stored = h5.dataset("data/Cn").unwrap().read_2d::<f64>().unwrap();
        assert_eq!(stored, raw.image.t());
        let trace = h5.dataset("data/C_raw").unwrap().read_2d::<f64>().unwrap();
        assert_eq!(trace.dim(), (4, 1));
    }

    #[test]
    fn test_load_flips_contour_and_transposes_image() {
        let file = NamedTempFile::new().unwrap();
        let raw = diagonal_raw();
        write_session_container(file.path(), &raw).unwrap();

        let session = load_session(file.path()).unwrap();
        assert_eq!(session.image(), &raw.image);
        assert_eq!(session.height(), 3);
        let contour = &session.contours()[0];
        assert_eq!(contour.xs(), vec![0.0, 1.0, 2.0]);
        assert_eq!(contour.ys(), vec![3.0, 2.0, 1.0]);
        assert_eq!(session.ids().ids(), &[0]);
    }

    #[test]
    fn test_metadata_path_round_trips_as_utf16() {
        let file = NamedTempFile::new().unwrap();
        write_session_container(file.path(), &diagonal_raw()).unwrap();

        let h5 = File::open(file.path()).unwrap();
        let units = h5.dataset("data/virmenPath").unwrap().read_raw::<u16>().unwrap();
        assert_eq!(units.len(), "D:\\virmen\\M12\\run_ü.mat".encode_utf16().count());

        let raw = read_raw_session(file.path()).unwrap();
        assert_eq!(raw.metadata_path, "D:\\virmen\\M12\\run_ü.mat");
    }

    #[test]
    fn test_empty_metadata_and_contour() {
        let file = NamedTempFile::new().unwrap();
        let mut raw = diagonal_raw();
        raw.metadata_path.clear();
        raw.contours = vec![Array2::zeros((2, 0))];
        write_session_container(file.path(), &raw).unwrap();

        let read = read_raw_session(file.path()).unwrap();
        assert!(read.metadata_path.is_empty());
        assert_eq!(read.contours[0].dim(), (2, 0));
    }

    #[test]
    fn test_zero_neuron_container_loads_and_is_rejected_on_install() {
        let file = NamedTempFile::new().unwrap();
        let raw = RawSession {
            image: array![[1.0, 2.0], [3.0, 4.0]],
            contours: Vec::new(),
            traces: TraceKind::ALL
                .iter()
                .filter(|kind| kind.is_required())
                .map(|&kind| (kind, Array2::zeros((0, 0))))
                .collect(),
            ids: Vec::new(),
            centroids: Some(Array2::zeros((0, 2))),
            metadata_path: String::new(),
        };
        write_session_container(file.path(), &raw).unwrap();

        let h5 = File::open(file.path()).unwrap();
        for name in ["data/C", "data/C_raw", "data/ids", "data/Coor", "data/centroids"] {
            let dataset = h5.dataset(name).unwrap();
            assert!(is_matlab_empty(&dataset).unwrap(), "{name}");
            assert_eq!(dataset.read_raw::<u64>().unwrap(), vec![0, 0]);
        }

        let session = load_session(file.path()).unwrap();
        assert_eq!(session.neuron_count(), 0);
        assert!(session.contours().is_empty());
        assert!(session.centroids().is_none());

        let err = civis_core::Annotator::default()
            .install(session, &mut [])
            .unwrap_err();
        assert!(matches!(
            Error::from(err),
            Error::Core(civis_core::Error::EmptySession)
        ));
    }

    #[test]
    fn test_optional_fields() {
        let file = NamedTempFile::new().unwrap();
        let mut raw = diagonal_raw();
        raw.traces.insert(TraceKind::Reraw, array![[5.0, 6.0, 7.0, 8.0]]);
        raw.centroids = Some(array![[1.5, 2.5]]);
        write_session_container(file.path(), &raw).unwrap();

        let session = load_session(file.path()).unwrap();
        let reraw = session.traces().row(TraceKind::Reraw, 0).unwrap();
        assert_relative_eq!(reraw[3], 8.0);
        assert_eq!(session.centroids(), Some(&array![[1.5, 2.5]]));
    }

    #[test]
    fn test_missing_trace_is_missing_field() {
        let file = NamedTempFile::new().unwrap();
        write_session_container(file.path(), &diagonal_raw()).unwrap();
        {
            let h5 = File::open_rw(file.path()).unwrap();
            h5.group("data").unwrap().unlink("C_denoised").unwrap();
        }
        let err = load_session(file.path()).unwrap_err();
        assert!(matches!(err, Error::MissingField(name) if name == "C_denoised"));
    }

    #[test]
    fn test_missing_data_group() {
        let file = NamedTempFile::new().unwrap();
        File::create(file.path()).unwrap().create_group("other").unwrap();
        let err = read_raw_session(file.path()).unwrap_err();
        assert!(matches!(err, Error::MissingField(name) if name == "data"));
    }

    #[test]
    fn test_trace_rows_must_match_ids() {
        let file = NamedTempFile::new().unwrap();
        let mut raw = diagonal_raw();
        raw.ids = vec![1.0, 2.0];
        raw.contours.push(array![[0.0], [0.0]]);
        write_session_container(file.path(), &raw).unwrap();

        let err = load_session(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(msg) if msg.contains("2 ids")));
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_session(dir.path().join("absent_v7.mat")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_non_hdf5_file_is_format_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"MATLAB 5.0 MAT-file").unwrap();
        assert!(load_session(file.path()).unwrap_err().is_format_error());
    }
}
