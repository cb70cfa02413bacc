use iced::widget::image::Handle;
use iced::widget::{
    button, column, container, horizontal_space, mouse_area, row, scrollable, stack, text,
};
use iced::{Alignment, Background, Color, ContentFit, Element, Length};
use iced_aw::Wrap;

use crate::state::data::{CatImage, LoadingState};
use crate::{CatGallery, Message};

/// Side of one square grid tile in logical pixels
const TILE_SIZE: f32 = 110.0;

/// Build the scrolling thumbnail grid with its loading/error affordances
/// and the footer controls.
pub fn view(app: &CatGallery) -> Element<'_, Message> {
    // First load with nothing to show yet: centered indicator only
    if app.elements.is_empty() && app.loading == LoadingState::Loading {
        return container(text("Loading cats…").size(20))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    }

    let tiles: Vec<Element<Message>> = app
        .elements
        .iter()
        .enumerate()
        .map(|(index, cat)| tile(app, index, cat))
        .collect();

    let grid: Element<Message> = Wrap::with_elements(tiles)
        .spacing(10.0)
        .line_spacing(10.0)
        .into();

    let mut scroll_content = column![grid].spacing(10).width(Length::Fill);

    // Pagination indicator below the last row while a batch is in flight
    if app.loading == LoadingState::Loading {
        scroll_content = scroll_content.push(
            container(text("Loading more…").size(16))
                .center_x(Length::Fill)
                .padding(16),
        );
    }

    let scroll = scrollable(container(scroll_content).width(Length::Fill).padding(10))
        .on_scroll(|viewport| Message::Scrolled(viewport.relative_offset().y))
        .height(Length::Fill);

    let mut content = column![scroll];

    if app.loading == LoadingState::Error {
        content = content.push(error_row(app));
    }

    content = content.push(footer(app));

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// One tappable square tile: thumbnail (or placeholder while the media
/// cache is still downloading) with a short id badge in the corner.
fn tile<'a>(app: &'a CatGallery, index: usize, cat: &'a CatImage) -> Element<'a, Message> {
    let picture: Element<Message> = match app.media.get(&cat.id) {
        Some(media) => iced::widget::image(Handle::from_path(media.thumbnail.clone()))
            .width(Length::Fixed(TILE_SIZE))
            .height(Length::Fixed(TILE_SIZE))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text(""))
            .width(Length::Fixed(TILE_SIZE))
            .height(Length::Fixed(TILE_SIZE))
            .style(|_theme| iced::widget::container::Style {
                background: Some(Background::Color(Color::from_rgb(0.25, 0.25, 0.25))),
                ..iced::widget::container::Style::default()
            })
            .into(),
    };

    let badge = container(text(short_id(&cat.id)).size(12))
        .padding(4)
        .style(|_theme| iced::widget::container::Style {
            background: Some(Background::Color(Color {
                a: 0.7,
                ..Color::BLACK
            })),
            text_color: Some(Color::WHITE),
            ..iced::widget::container::Style::default()
        });

    let badge_layer = container(badge)
        .width(Length::Fixed(TILE_SIZE))
        .align_x(iced::alignment::Horizontal::Right);

    mouse_area(stack([picture, badge_layer.into()]))
        .on_press(Message::Select(index))
        .into()
}

/// First few characters of the id, enough to tell tiles apart.
fn short_id(id: &str) -> String {
    id.chars().take(4).collect()
}

/// Error banner with the retry control, shown only in the Error state.
fn error_row(app: &CatGallery) -> Element<'_, Message> {
    let details = app
        .last_error
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "Loading failed".to_string());

    container(
        column![
            text(details).size(14),
            button("Retry").on_press(Message::LoadMore).padding(10),
        ]
        .spacing(8)
        .align_x(Alignment::Center),
    )
    .center_x(Length::Fill)
    .padding(16)
    .into()
}

/// Status line plus the Clear control.
fn footer(app: &CatGallery) -> Element<'_, Message> {
    row![
        text(&app.status).size(14),
        horizontal_space(),
        button(text("Clear").size(18))
            .on_press(Message::ClearAll)
            .padding(10),
    ]
    .spacing(20)
    .padding(10)
    .align_y(Alignment::Center)
    .into()
}
