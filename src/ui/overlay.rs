use iced::widget::image::Handle;
use iced::widget::{container, mouse_area, stack, text};
use iced::{ContentFit, Element, Length};

use crate::{CatGallery, Message};

/// Full-screen viewer for the selected image, with its index in the
/// top-left corner. Clicking anywhere dismisses it.
///
/// The selected index is bounds-checked at render time because the list
/// can shrink (clear-and-reload) while the overlay is open.
pub fn view(app: &CatGallery) -> Element<'_, Message> {
    let picture: Element<Message> = match app.elements.get(app.selected) {
        Some(cat) => match app.media.get(&cat.id) {
            Some(media) => iced::widget::image(Handle::from_path(media.preview.clone()))
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Contain)
                .into(),
            None => centered_note("Still downloading…"),
        },
        None => centered_note("Image no longer loaded"),
    };

    let index_label = container(text(app.selected.to_string()).size(24)).padding(16);

    mouse_area(
        container(stack([picture, index_label.into()]))
            .width(Length::Fill)
            .height(Length::Fill),
    )
    .on_press(Message::DismissOverlay)
    .into()
}

fn centered_note(note: &str) -> Element<'_, Message> {
    container(text(note).size(18))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
