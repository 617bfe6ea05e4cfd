use super::animation::{AnimationTicket, Animator, TickOutcome};
use super::camera::CameraState;
use super::config::AnimationConfig;
use crate::core::geometry::orientation::BestView;
use crate::core::models::frame::Frame;
use crate::core::models::ids::ObjectId;
use nalgebra::Point3;
use slotmap::SlotMap;
use std::time::Duration;

/// A named trajectory: frames in load order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureObject {
    pub name: String,
    pub frames: Vec<Frame>,
    /// Reference-subset coordinates of the first frame; later frames are superposed on it.
    pub alignment_reference: Option<Vec<Point3<f64>>>,
}

impl StructureObject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            frames: Vec::new(),
            alignment_reference: None,
        }
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }
}

/// Everything a viewer keeps between calls: loaded objects, the camera and its animator.
#[derive(Debug, Clone)]
pub struct Session {
    objects: SlotMap<ObjectId, StructureObject>,
    order: Vec<ObjectId>,
    camera: CameraState,
    animator: Animator,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl Session {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            objects: SlotMap::with_key(),
            order: Vec::new(),
            camera: CameraState::default(),
            animator: Animator::new(config),
        }
    }

    /// Objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &StructureObject)> {
        self.order
            .iter()
            .filter_map(|&id| self.objects.get(id).map(|object| (id, object)))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object(&self, id: ObjectId) -> Option<&StructureObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut StructureObject> {
        self.objects.get_mut(id)
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    /// Returns the object called `name`, creating an empty one if needed.
    pub fn object_named(&mut self, name: &str) -> ObjectId {
        if let Some(id) = self.find_object(name) {
            return id;
        }
        let id = self.objects.insert(StructureObject::new(name));
        self.order.push(id);
        id
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<StructureObject> {
        let removed = self.objects.remove(id)?;
        self.order.retain(|&other| other != id);
        Some(removed)
    }

    /// Discards every object and stops any running animation.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.order.clear();
        self.animator.cancel();
        self.camera.clear_framing();
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraState {
        &mut self.camera
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Points the camera at `view` immediately, cancelling any running animation.
    pub fn set_camera_view(&mut self, view: &BestView) {
        self.animator.cancel();
        self.camera.snap_to(view);
    }

    /// Animates the camera from where it is now to `target`.
    pub fn animate_camera_to(&mut self, target: CameraState) -> (AnimationTicket, Duration) {
        self.animator.start(&self.camera, target)
    }

    pub fn tick(&mut self, ticket: AnimationTicket, elapsed: Duration) -> TickOutcome {
        self.animator.tick(ticket, elapsed, &mut self.camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::rotation::rotation_z;

    #[test]
    fn objects_are_created_once_per_name_in_order() {
        let mut session = Session::default();
        let a = session.object_named("alpha");
        let b = session.object_named("beta");
        assert_eq!(session.object_named("alpha"), a);
        assert_eq!(session.len(), 2);

        let names: Vec<&str> = session.objects().map(|(_, o)| o.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(session.find_object("beta"), Some(b));
        assert_eq!(session.find_object("gamma"), None);
    }

    #[test]
    fn removing_an_object_invalidates_its_id() {
        let mut session = Session::default();
        let a = session.object_named("alpha");
        session.object_named("beta");
        assert_eq!(session.remove_object(a).map(|o| o.name), Some("alpha".to_string()));
        assert!(session.object(a).is_none());
        assert!(session.remove_object(a).is_none());
        assert_eq!(session.objects().count(), 1);
    }

    #[test]
    fn clear_drops_objects_and_cancels_animation() {
        let mut session = Session::default();
        session.object_named("alpha");
        let target = CameraState {
            rotation: rotation_z(1.0),
            ..CameraState::default()
        };
        let (ticket, _) = session.animate_camera_to(target);
        assert!(session.animator().is_running());

        session.clear();
        assert!(session.is_empty());
        assert!(!session.animator().is_running());
        assert_eq!(
            session.tick(ticket, Duration::from_millis(10)),
            TickOutcome::Superseded
        );
    }
}
