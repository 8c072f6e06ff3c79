//! Simple game schema and stylesheet.

use crate::core::{FieldIndex, GeometryConfig};
use crate::data::{Descriptor, Field, FieldKind, Game, Set, StyleSheet, TextStyle};
use crate::script::{Expr, Scriptable};

/// Card field names, in index order.
pub const CARD_FIELDS: [&str; 10] = [
    "name",
    "cost",
    "power",
    "toughness",
    "type",
    "title",
    "pt",
    "rules",
    "keywords_found",
    "heading",
];

/// Set field names, in index order.
pub const SET_FIELDS: [&str; 3] = ["title", "card_count", "summary"];

fn card_field(name: &str) -> FieldIndex {
    let index = CARD_FIELDS.iter().position(|&n| n == name).unwrap_or(0);
    FieldIndex(index as u32)
}

/// Builder for the simple game.
#[derive(Clone, Debug)]
pub struct SimpleGame {
    geometry: GeometryConfig,
    card_width: f64,
    card_height: f64,
}

impl Default for SimpleGame {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            card_width: 375.0,
            card_height: 523.0,
        }
    }
}

impl SimpleGame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use other geometry thresholds for the stylesheet.
    #[must_use]
    pub fn with_geometry(mut self, geometry: GeometryConfig) -> Self {
        self.geometry = geometry;
        self
    }

    /// Use another card size.
    #[must_use]
    pub fn with_card_size(mut self, width: f64, height: f64) -> Self {
        self.card_width = width;
        self.card_height = height;
        self
    }

    /// The game schema.
    #[must_use]
    pub fn game(&self) -> Game {
        Game::new("simple")
            .with_card_field(Field::text("name"))
            .with_card_field(Field::text("cost"))
            .with_card_field(Field::text("power").with_initial("1"))
            .with_card_field(Field::text("toughness").with_initial("1"))
            .with_card_field(Field::new("type", FieldKind::Choice).with_initial("creature"))
            .with_card_field(
                Field::text("title")
                    .with_script(Expr::concat([
                        Expr::card("name"),
                        Expr::text(" "),
                        Expr::card("cost"),
                    ]))
                    .read_only(),
            )
            .with_card_field(
                Field::text("pt")
                    .with_script(Expr::concat([
                        Expr::card("power"),
                        Expr::text("/"),
                        Expr::card("toughness"),
                    ]))
                    .read_only(),
            )
            .with_card_field(Field::text("rules"))
            .with_card_field(
                Field::new("keywords_found", FieldKind::Info)
                    .with_script(Expr::card("rules").keywords()),
            )
            .with_card_field(
                Field::new("heading", FieldKind::Info).with_script(Expr::card("title")),
            )
            .with_set_field(Field::text("title").with_initial("Untitled"))
            .with_set_field(Field::new("card_count", FieldKind::Info).with_script(Expr::cards().count()))
            .with_set_field(Field::new("summary", FieldKind::Info).with_script(Expr::concat([
                Expr::set("title"),
                Expr::text(" ("),
                Expr::cards().count(),
                Expr::text(" cards)"),
            ])))
    }

    /// The stylesheet for a game built by [`game`](Self::game).
    #[must_use]
    pub fn stylesheet(&self, game: &Game) -> StyleSheet {
        let body = || TextStyle {
            alignment: Scriptable::new("top left".to_string()),
            padding_left: Scriptable::new(2.0),
            padding_right: Scriptable::new(2.0),
            padding_top: Scriptable::new(1.0),
            padding_bottom: Scriptable::new(1.0),
        };
        StyleSheet::for_game("simple-standard", game, &self.geometry)
            .with_card_size(self.card_width, self.card_height)
            .with_styling_field(Field::text("frame").with_initial("classic"))
            .with_card_style(card_field("name"), |s| {
                s.at(20.0, 20.0)
                    .sized(280.0, 30.0)
                    .with_mask(Scriptable::scripted(
                        Expr::concat([Expr::text("mask-"), Expr::styling("frame")]),
                        String::new(),
                    ))
                    .with_text(body())
                    .with_z_index(1)
            })
            .with_card_style(card_field("cost"), |s| {
                s.with(Descriptor::Right, 355.0)
                    .with(Descriptor::Top, 20.0)
                    .sized(60.0, 30.0)
            })
            .with_card_style(card_field("type"), |s| s.at(20.0, 270.0).sized(335.0, 20.0))
            .with_card_style(card_field("rules"), |s| {
                s.at(30.0, 300.0)
                    .with(Descriptor::Width, 315.0)
                    .scripted(
                        Descriptor::Height,
                        Expr::card_style("rules", "content_height").add(Expr::lit(10.0)),
                    )
                    .with_text(body())
            })
            .with_card_style(card_field("pt"), |s| {
                s.with(Descriptor::Right, 355.0)
                    .with(Descriptor::Bottom, 500.0)
                    .sized(60.0, 25.0)
                    .with_visible(Scriptable::scripted(
                        Expr::card("type").eq(Expr::text("creature")),
                        true,
                    ))
            })
            .with_card_style(card_field("heading"), |s| {
                s.at(20.0, 60.0).scripted(
                    Descriptor::Width,
                    Expr::if_(
                        Expr::card("heading").eq(Expr::text(" ")),
                        Expr::lit(0.0),
                        Expr::lit(200.0),
                    ),
                )
            })
            .with_extra_card_field(
                Field::text("border").with_script(Expr::concat([
                    Expr::text("border-"),
                    Expr::card("type"),
                ])),
                |s| s.at(0.0, 0.0).sized(375.0, 523.0).with_z_index(-1),
            )
    }

    /// An empty set of the game.
    #[must_use]
    pub fn build(&self) -> Set {
        let game = self.game();
        let sheet = self.stylesheet(&game);
        match Set::new(game, sheet) {
            Ok(set) => set,
            Err(error) => unreachable!("simple stylesheet matches its game: {error}"),
        }
    }
}
