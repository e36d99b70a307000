//! Slide carousel.
//!
//! A track entity tagged [`CarouselTrack`] holds one child per slide. Once
//! it has at least one slide it gets a [`Carousel`] cursor and an autoplay
//! timer. Button presses and timer ticks both become [`CarouselStep`]
//! messages, and [`apply_carousel_steps`] is the only system that moves a
//! cursor.

use bevy::prelude::*;

use crate::SiteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Prev,
    Next,
}

/// Cursor over a fixed number of slides, wrapping at both ends.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    cursor: usize,
    slides: usize,
}

impl Carousel {
    /// `None` when there is nothing to show.
    pub fn new(slides: usize) -> Option<Self> {
        (slides > 0).then_some(Self { cursor: 0, slides })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn slide_count(&self) -> usize {
        self.slides
    }

    /// Moves one slide and returns the new cursor.
    pub fn step(&mut self, step: Step) -> usize {
        let last = self.slides - 1;
        self.cursor = match step {
            Step::Next if self.cursor == last => 0,
            Step::Next => self.cursor + 1,
            Step::Prev if self.cursor == 0 => last,
            Step::Prev => self.cursor - 1,
        };
        self.cursor
    }

    /// Track offset that brings the current slide fully into view.
    pub fn offset(&self) -> Val {
        Val::Percent(-100.0 * self.cursor as f32)
    }
}

/// Marks the strip whose children are the slides.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CarouselTrack;

/// Set on a track that had no slides at initialization.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CarouselInert;

#[derive(Component, Debug, Clone, Copy)]
pub struct CarouselButton {
    pub track: Entity,
    pub step: Step,
}

#[derive(Component, Debug, Clone)]
pub struct CarouselAutoplay(pub Timer);

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselStep {
    pub track: Entity,
    pub step: Step,
}

pub struct CarouselPlugin;

impl Plugin for CarouselPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<CarouselStep>().add_systems(
            Update,
            (
                init_carousels,
                (carousel_button_clicks, autoplay_carousels),
                apply_carousel_steps,
            ).chain()
        );
    }
}

pub fn init_carousels(
    mut commands: Commands,
    config: Res<SiteConfig>,
    tracks: Query<
        (Entity, Option<&Children>),
        (With<CarouselTrack>, Without<Carousel>, Without<CarouselInert>)
    >
) {
    for (entity, children) in &tracks {
        let slides = children.map_or(0, |children| children.len());
        match Carousel::new(slides) {
            Some(carousel) => {
                debug!("Carousel {} ready with {} slides", entity, slides);
                commands
                    .entity(entity)
                    .insert((
                        carousel,
                        CarouselAutoplay(Timer::new(config.autoplay_interval, TimerMode::Repeating)),
                    ));
            }
            None => {
                warn!("Carousel {} has no slides, leaving it inert", entity);
                commands.entity(entity).insert(CarouselInert);
            }
        }
    }
}

pub fn carousel_button_clicks(
    buttons: Query<(&Interaction, &CarouselButton), Changed<Interaction>>,
    mut steps: MessageWriter<CarouselStep>
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed {
            steps.write(CarouselStep { track: button.track, step: button.step });
        }
    }
}

pub fn autoplay_carousels(
    time: Res<Time>,
    mut timers: Query<(Entity, &mut CarouselAutoplay)>,
    mut steps: MessageWriter<CarouselStep>
) {
    for (track, mut autoplay) in &mut timers {
        let fired = autoplay.0.tick(time.delta()).times_finished_this_tick();
        for _ in 0..fired {
            steps.write(CarouselStep { track, step: Step::Next });
        }
    }
}

pub fn apply_carousel_steps(
    mut steps: MessageReader<CarouselStep>,
    mut tracks: Query<(&mut Carousel, &mut Node)>
) {
    for message in steps.read() {
        let Ok((mut carousel, mut node)) = tracks.get_mut(message.track) else {
            continue;
        };
        carousel.step(message.step);
        node.left = carousel.offset();
    }
}
