//! Typed reading and leading-axis concatenation of member datasets.

use crate::error::{LcmvError, Result};
use crate::models::{ElementType, Shape};
use half::f16;
use hdf5::{Dataset, Group, H5Type};
use ndarray::{concatenate, ArrayD, ArrayViewD, Axis};
use tracing::debug;

/// Member metadata gathered before any data is read.
struct Member {
    path: String,
    dataset: Dataset,
    shape: Shape,
    element_type: ElementType,
}

impl Member {
    fn inspect(dataset: Dataset) -> Result<Self> {
        let path = dataset.name();
        let descriptor = dataset.dtype()?.to_descriptor()?;
        let element_type = ElementType::from_descriptor(&descriptor).ok_or_else(|| {
            LcmvError::UnsupportedType {
                path: path.clone(),
                descriptor: format!("{:?}", descriptor),
            }
        })?;
        let shape = Shape::from(dataset.shape());

        Ok(Self {
            path,
            dataset,
            shape,
            element_type,
        })
    }
}

/// Check that every member can be stacked onto the first one and return
/// the common element type they are read as.
fn check_compatible(members: &[Member]) -> Result<ElementType> {
    let first = &members[0];
    let mut common = first.element_type;

    for member in members {
        if member.shape.ndim() == 0 {
            return Err(LcmvError::ScalarDataset {
                path: member.path.clone(),
            });
        }
        if member.shape.trailing() != first.shape.trailing()
            || member.shape.ndim() != first.shape.ndim()
        {
            return Err(LcmvError::ShapeMismatch {
                path: member.path.clone(),
                expected: first.shape.clone(),
                found: member.shape.clone(),
            });
        }
        common = common.promote(member.element_type);
    }

    Ok(common)
}

/// Element types a member can be read as.
trait Element: H5Type + Clone {
    /// HDF5 has no conversion from its boolean enum to numbers, so
    /// boolean members are widened after reading.
    fn from_bool(value: bool) -> Self;
}

macro_rules! numeric_element {
    ($($ty:ty),+) => {
        $(
            impl Element for $ty {
                fn from_bool(value: bool) -> Self {
                    u8::from(value) as $ty
                }
            }
        )+
    };
}

numeric_element!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl Element for bool {
    fn from_bool(value: bool) -> Self {
        value
    }
}

impl Element for f16 {
    fn from_bool(value: bool) -> Self {
        f16::from(u8::from(value))
    }
}

/// Read one member as `T`, letting HDF5 convert numeric types.
fn read_member<T: Element>(member: &Member) -> hdf5::Result<ArrayD<T>> {
    if member.element_type == ElementType::Bool {
        Ok(member.dataset.read_dyn::<bool>()?.mapv(T::from_bool))
    } else {
        member.dataset.read_dyn::<T>()
    }
}

fn read_concatenated<T: Element>(members: &[Member]) -> Result<ArrayD<T>> {
    let parts = members
        .iter()
        .map(read_member::<T>)
        .collect::<hdf5::Result<Vec<_>>>()?;

    let views: Vec<ArrayViewD<'_, T>> = parts.iter().map(|part| part.view()).collect();
    Ok(concatenate(Axis(0), &views)?)
}

macro_rules! vertex_array {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        /// Concatenated vertices in the common element type of the members.
        #[derive(Debug, Clone, PartialEq)]
        pub enum VertexArray {
            $($variant(ArrayD<$ty>),)+
        }

        impl VertexArray {
            fn read(element_type: ElementType, members: &[Member]) -> Result<Self> {
                match element_type {
                    $(ElementType::$variant => Ok(Self::$variant(read_concatenated::<$ty>(members)?)),)+
                }
            }

            pub fn shape(&self) -> Shape {
                match self {
                    $(Self::$variant(array) => Shape::from(array.shape()),)+
                }
            }

            pub fn element_type(&self) -> ElementType {
                match self {
                    $(Self::$variant(_) => ElementType::$variant,)+
                }
            }

            /// Create a new dataset called `name` in `group` holding this array.
            pub fn create_in(&self, group: &Group, name: &str) -> hdf5::Result<Dataset> {
                match self {
                    $(Self::$variant(array) => group
                        .new_dataset_builder()
                        .with_data(array.view())
                        .create(name),)+
                }
            }
        }

        $(
            impl From<ArrayD<$ty>> for VertexArray {
                fn from(array: ArrayD<$ty>) -> Self {
                    Self::$variant(array)
                }
            }
        )+
    };
}

vertex_array! {
    Bool => bool,
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    F16 => f16,
    F32 => f32,
    F64 => f64,
}

/// Read the named members of `group` in the given order and stack them
/// along the leading axis.
///
/// Shapes and element types are checked from metadata before any data
/// is read, so an incompatible member fails without touching the rest.
/// Members of different numeric types are promoted to a common type.
pub fn concatenate_members(group: &Group, ordered: &[String]) -> Result<VertexArray> {
    if ordered.is_empty() {
        return Err(LcmvError::EmptySource { path: group.name() });
    }

    let members = ordered
        .iter()
        .map(|name| Member::inspect(group.dataset(name)?))
        .collect::<Result<Vec<_>>>()?;

    let element_type = check_compatible(&members)?;
    for member in &members {
        debug!(
            "Reading {} {} ({} x {})",
            member.path,
            member.shape,
            member.shape.element_count(),
            member.element_type
        );
        if member.element_type != element_type {
            debug!("Promoting {} to {}", member.path, element_type);
        }
    }

    VertexArray::read(element_type, &members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdf5::File;
    use ndarray::{arr1, arr2, Array2};

    fn scratch_file() -> (tempfile::TempDir, File) {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("members.h5")).unwrap();
        (dir, file)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_concatenate_in_given_order() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("spatial_position").unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr2(&[[1.0f64, 1.0], [2.0, 2.0]]))
            .create("sp_0")
            .unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr2(&[[3.0f64, 3.0]]))
            .create("sp_1")
            .unwrap();

        let vertices = concatenate_members(&group, &names(&["sp_1", "sp_0"])).unwrap();
        assert_eq!(vertices.shape(), Shape::new(vec![3, 2]));
        assert_eq!(vertices.element_type(), ElementType::F64);

        let expected = arr2(&[[3.0f64, 3.0], [1.0, 1.0], [2.0, 2.0]]).into_dyn();
        assert_eq!(vertices, VertexArray::from(expected));
    }

    #[test]
    fn test_shape_law() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("spatial_position").unwrap();
        for (i, rows) in [4usize, 1, 6].iter().enumerate() {
            let data = Array2::<i32>::zeros((*rows, 3));
            group
                .new_dataset_builder()
                .with_data(&data)
                .create(format!("sp_{}", i).as_str())
                .unwrap();
        }

        let vertices =
            concatenate_members(&group, &names(&["sp_0", "sp_1", "sp_2"])).unwrap();
        assert_eq!(vertices.shape(), Shape::new(vec![11, 3]));
        assert_eq!(vertices.element_type(), ElementType::I32);
    }

    #[test]
    fn test_one_dimensional_members() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("g").unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[1u32, 2]))
            .create("v_0")
            .unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[3u32]))
            .create("v_1")
            .unwrap();

        let vertices = concatenate_members(&group, &names(&["v_0", "v_1"])).unwrap();
        assert_eq!(
            vertices,
            VertexArray::from(arr1(&[1u32, 2, 3]).into_dyn())
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("g").unwrap();
        group
            .new_dataset_builder()
            .with_data(&Array2::<f64>::zeros((3, 3)))
            .create("sp_0")
            .unwrap();
        group
            .new_dataset_builder()
            .with_data(&Array2::<f64>::zeros((2, 4)))
            .create("sp_1")
            .unwrap();

        let err = concatenate_members(&group, &names(&["sp_0", "sp_1"])).unwrap_err();
        assert!(matches!(err, LcmvError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_rank_mismatch() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("g").unwrap();
        group
            .new_dataset_builder()
            .with_data(&Array2::<f64>::zeros((3, 1)))
            .create("sp_0")
            .unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[1.0f64, 2.0]))
            .create("sp_1")
            .unwrap();

        let err = concatenate_members(&group, &names(&["sp_0", "sp_1"])).unwrap_err();
        assert!(matches!(err, LcmvError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_mixed_floats_promote_to_f64() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("g").unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr2(&[[1.5f64, -2.0]]))
            .create("sp_0")
            .unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr2(&[[0.25f32, 4.0]]))
            .create("sp_1")
            .unwrap();

        let vertices = concatenate_members(&group, &names(&["sp_0", "sp_1"])).unwrap();
        assert_eq!(vertices.element_type(), ElementType::F64);
        assert_eq!(
            vertices,
            VertexArray::from(arr2(&[[1.5f64, -2.0], [0.25, 4.0]]).into_dyn())
        );
    }

    #[test]
    fn test_signed_and_unsigned_promote_to_signed() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("g").unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[-1i32, 2]))
            .create("sp_0")
            .unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[200u8]))
            .create("sp_1")
            .unwrap();

        let vertices = concatenate_members(&group, &names(&["sp_0", "sp_1"])).unwrap();
        assert_eq!(
            vertices,
            VertexArray::from(arr1(&[-1i32, 2, 200]).into_dyn())
        );
    }

    #[test]
    fn test_integers_with_float_promote_to_float() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("g").unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[7i64]))
            .create("sp_0")
            .unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[0.5f32]))
            .create("sp_1")
            .unwrap();

        let vertices = concatenate_members(&group, &names(&["sp_0", "sp_1"])).unwrap();
        assert_eq!(
            vertices,
            VertexArray::from(arr1(&[7.0f64, 0.5]).into_dyn())
        );
    }

    #[test]
    fn test_boolean_members() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("g").unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[true, false]))
            .create("m_0")
            .unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[false]))
            .create("m_1")
            .unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[9u8]))
            .create("m_2")
            .unwrap();

        let flags = concatenate_members(&group, &names(&["m_0", "m_1"])).unwrap();
        assert_eq!(
            flags,
            VertexArray::from(arr1(&[true, false, false]).into_dyn())
        );

        let widened = concatenate_members(&group, &names(&["m_0", "m_2"])).unwrap();
        assert_eq!(
            widened,
            VertexArray::from(arr1(&[1u8, 0, 9]).into_dyn())
        );
    }

    #[test]
    fn test_string_member_is_unsupported() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("g").unwrap();
        let label: hdf5::types::VarLenUnicode = "vertex".parse().unwrap();
        group
            .new_dataset_builder()
            .with_data(&arr1(&[label]))
            .create("sp_0")
            .unwrap();

        let err = concatenate_members(&group, &names(&["sp_0"])).unwrap_err();
        assert!(matches!(err, LcmvError::UnsupportedType { .. }));
    }

    #[test]
    fn test_scalar_member() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("g").unwrap();
        group
            .new_dataset::<f64>()
            .shape(())
            .create("sp_0")
            .unwrap()
            .write_scalar(&1.0)
            .unwrap();

        let err = concatenate_members(&group, &names(&["sp_0"])).unwrap_err();
        assert!(matches!(err, LcmvError::ScalarDataset { .. }));
    }

    #[test]
    fn test_empty_source() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("spatial_position").unwrap();

        let err = concatenate_members(&group, &[]).unwrap_err();
        assert!(matches!(err, LcmvError::EmptySource { .. }));
    }

    #[test]
    fn test_create_in_round_trip() {
        let (_dir, file) = scratch_file();
        let group = file.create_group("ens_A").unwrap();
        let vertices = VertexArray::from(arr2(&[[1i64, 2], [3, 4]]).into_dyn());

        let dataset = vertices.create_in(&group, "out").unwrap();
        assert_eq!(dataset.shape(), vec![2, 2]);
        let stored = dataset.read_2d::<i64>().unwrap();
        assert_eq!(stored, arr2(&[[1i64, 2], [3, 4]]));
    }
}
