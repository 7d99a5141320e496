mod modal_overlay;
pub use modal_overlay::ModalOverlay;

mod image_modal;
pub use image_modal::ImageModal;
