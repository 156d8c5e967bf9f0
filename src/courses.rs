//! Courses offered on the platform

use crate::client::Access;
use crate::payload::BodyKind;
use crate::resource::{Resource, ResourceStore};

/// Course routes. Courses carry a cover image, so both create and update
/// take multipart form data.
#[derive(Debug)]
pub struct Course;

impl Resource for Course {
    const PATH: &'static str = "/api/courses";
    const PLURAL: &'static str = "courses";
    const SINGULAR: &'static str = "course";
    const LABEL: &'static str = "Course";
    const ACCESS: Access = Access::Bearer;
    const CREATE_BODY: BodyKind = BodyKind::Form;
    const UPDATE_BODY: BodyKind = BodyKind::Form;
}

/// Store holding the course catalogue
pub type CoursesStore = ResourceStore<Course>;
