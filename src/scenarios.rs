//! Built-in fixture posters.
//!
//! Each scenario is a complete [`PosterDoc`] modeled on a real event-poster
//! style: conference program, concert bill, meeting notice, festival poster
//! and a plain party announcement. They exist to produce stable OCR test
//! images, so geometry and palettes are fixed values rather than knobs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{
    foundation::core::{Canvas, Rgba8},
    model::{Decoration, FontSpec, HighlightRule, PosterDoc, StyleSheet, TextLine, Tier},
};

const WHITE: Rgba8 = Rgba8::rgb(255, 255, 255);
const BLACK: Rgba8 = Rgba8::rgb(0, 0, 0);
const CRIMSON: Rgba8 = Rgba8::rgb(220, 20, 60);
const AMBER: Rgba8 = Rgba8::rgb(243, 156, 18);
const MIDNIGHT: Rgba8 = Rgba8::rgb(26, 26, 46);
const SLATE: Rgba8 = Rgba8::rgb(44, 62, 80);
const ASH: Rgba8 = Rgba8::rgb(127, 140, 141);
const BOX_FILL: Rgba8 = Rgba8::rgb(245, 245, 245);
const BOX_EDGE: Rgba8 = Rgba8::rgb(200, 200, 200);

/// Well-known Korean-capable font locations across macOS, Windows and Linux.
/// Callers pass these (or their own list) into `FontSpec`; nothing here is
/// consulted implicitly.
pub fn korean_font_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/System/Library/Fonts/AppleSDGothicNeo.ttc"),
        PathBuf::from("/System/Library/Fonts/Helvetica.ttc"),
        PathBuf::from("C:/Windows/Fonts/malgun.ttf"),
        PathBuf::from("/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc"),
    ]
}

/// A named fixture poster plus its conventional output file name.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub name: &'static str,
    pub file_name: &'static str,
    pub doc: PosterDoc,
}

/// Every built-in scenario, in a stable order.
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "conference",
            file_name: "test-conference.png",
            doc: conference(),
        },
        Scenario {
            name: "concert",
            file_name: "test-concert.png",
            doc: concert(),
        },
        Scenario {
            name: "meeting",
            file_name: "test-meeting.png",
            doc: meeting(),
        },
        Scenario {
            name: "festival",
            file_name: "test-poster.png",
            doc: festival(),
        },
        Scenario {
            name: "year-end-party",
            file_name: "test-year-end.png",
            doc: year_end_party(),
        },
    ]
}

pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|s| s.name == name)
}

fn fonts_for(sizes: &[(Tier, f32)]) -> BTreeMap<Tier, FontSpec> {
    sizes
        .iter()
        .map(|(tier, size)| (*tier, FontSpec::new(korean_font_candidates(), *size)))
        .collect()
}

fn conference() -> PosterDoc {
    let mut tier_pitch = BTreeMap::new();
    tier_pitch.insert(Tier::Title, 70.0);

    PosterDoc {
        style: StyleSheet {
            canvas: Canvas::new(800, 600),
            background: WHITE,
            fonts: fonts_for(&[(Tier::Title, 36.0), (Tier::Body, 20.0)]),
            text_color: BLACK,
            accent_color: CRIMSON,
            line_pitch: 35.0,
            tier_pitch,
            start_offset: 50.0,
            left_margin: 50.0,
            highlight: HighlightRule::default(),
            decorations: vec![Decoration::Border {
                inset: 20.0,
                thickness: 2.0,
                color: BLACK,
            }],
        },
        lines: vec![
            TextLine::left("2025 AI 컨퍼런스", Tier::Title),
            TextLine::left("일시: 2025년 3월 15일 (토) 10:00", Tier::Body),
            TextLine::left("장소: 서울 코엑스 컨퍼런스홀 401호", Tier::Body),
            TextLine::left("주최: 한국인공지능학회", Tier::Body),
            TextLine::left("", Tier::Body),
            TextLine::left("주요 주제:", Tier::Body),
            TextLine::left("• 대규모 언어 모델의 최신 동향", Tier::Body),
            TextLine::left("• 멀티모달 AI와 산업 응용", Tier::Body),
            TextLine::left("• AI 윤리와 규제 프레임워크", Tier::Body),
            TextLine::left("참가비: 무료 (사전 등록 필수)", Tier::Body),
        ],
    }
}

fn concert() -> PosterDoc {
    let mut tier_pitch = BTreeMap::new();
    tier_pitch.insert(Tier::Title, 80.0);
    tier_pitch.insert(Tier::Subtitle, 60.0);

    PosterDoc {
        style: StyleSheet {
            canvas: Canvas::new(800, 1000),
            background: MIDNIGHT,
            fonts: fonts_for(&[
                (Tier::Title, 48.0),
                (Tier::Subtitle, 36.0),
                (Tier::Body, 24.0),
            ]),
            text_color: WHITE,
            accent_color: AMBER,
            line_pitch: 40.0,
            tier_pitch,
            start_offset: 80.0,
            left_margin: 50.0,
            highlight: HighlightRule::keywords(["티켓", "가격"]),
            decorations: vec![Decoration::Border {
                inset: 30.0,
                thickness: 3.0,
                color: AMBER,
            }],
        },
        lines: vec![
            TextLine::centered("이한별 단독 콘서트", Tier::Title).with_color(AMBER),
            TextLine::centered("별빛 아래에서", Tier::Subtitle),
            TextLine::centered("2025", Tier::Body),
            TextLine::left("", Tier::Body),
            TextLine::centered("일시: 2025년 8월 30일 (토) 19:00", Tier::Body),
            TextLine::centered("장소: 올림픽공원 체조경기장", Tier::Body),
            TextLine::centered("티켓 가격:", Tier::Body),
            TextLine::left("• VIP석 150,000원", Tier::Body),
            TextLine::left("• R석 120,000원", Tier::Body),
            TextLine::left("• S석 90,000원", Tier::Body),
            TextLine::left("", Tier::Body),
            TextLine::centered("예매: 인터파크 티켓", Tier::Body),
        ],
    }
}

fn meeting() -> PosterDoc {
    let mut tier_pitch = BTreeMap::new();
    tier_pitch.insert(Tier::Title, 75.0);

    PosterDoc {
        style: StyleSheet {
            canvas: Canvas::new(600, 400),
            background: WHITE,
            fonts: fonts_for(&[(Tier::Title, 28.0), (Tier::Body, 16.0)]),
            text_color: SLATE,
            accent_color: CRIMSON,
            line_pitch: 25.0,
            tier_pitch,
            start_offset: 25.0,
            left_margin: 50.0,
            highlight: HighlightRule::default(),
            // Zero-inset full-height rule doubles as the header band.
            decorations: vec![Decoration::Rule {
                y: 0.0,
                inset: 0.0,
                thickness: 80.0,
                color: SLATE,
            }],
        },
        lines: vec![
            TextLine::centered("주간 팀 미팅", Tier::Title).with_color(WHITE),
            TextLine::left("일시: 매주 월요일 오전 10시", Tier::Body),
            TextLine::left("장소: 3층 대회의실", Tier::Body),
            TextLine::left("", Tier::Body),
            TextLine::left("안건:", Tier::Body),
            TextLine::left("- 분기 목표 점검", Tier::Body),
            TextLine::left("- 신규 프로젝트 일정 공유", Tier::Body),
            TextLine::left("- 기타 논의 사항", Tier::Body),
            TextLine::left("", Tier::Body),
            TextLine::left("문의: 경영지원팀 (내선 1234)", Tier::Body).with_color(ASH),
        ],
    }
}

fn festival() -> PosterDoc {
    let mut tier_pitch = BTreeMap::new();
    tier_pitch.insert(Tier::Title, 160.0);
    tier_pitch.insert(Tier::Subtitle, 70.0);
    tier_pitch.insert(Tier::Body, 120.0);

    PosterDoc {
        style: StyleSheet {
            canvas: Canvas::new(800, 1200),
            background: WHITE,
            fonts: fonts_for(&[
                (Tier::Title, 72.0),
                (Tier::Subtitle, 48.0),
                (Tier::Body, 36.0),
                (Tier::Small, 28.0),
            ]),
            text_color: BLACK,
            accent_color: CRIMSON,
            line_pitch: 80.0,
            tier_pitch,
            start_offset: 100.0,
            left_margin: 50.0,
            highlight: HighlightRule::keywords(["원"]),
            decorations: vec![
                Decoration::Rule {
                    y: 200.0,
                    inset: 50.0,
                    thickness: 5.0,
                    color: CRIMSON,
                },
                Decoration::LineBox {
                    line: 3,
                    padding: 20.0,
                    corner_radius: 10.0,
                    fill: BOX_FILL,
                    outline: Some(BOX_EDGE),
                    outline_width: 2.0,
                },
                Decoration::CornerMarks {
                    inset: 50.0,
                    size: 50.0,
                    thickness: 3.0,
                    color: CRIMSON,
                },
                Decoration::Rule {
                    y: 1100.0,
                    inset: 50.0,
                    thickness: 3.0,
                    color: CRIMSON,
                },
            ],
        },
        lines: vec![
            TextLine::centered("서울 재즈 페스티벌", Tier::Title),
            TextLine::centered("2025년 5월 24일 - 25일", Tier::Subtitle).with_color(CRIMSON),
            TextLine::centered("오후 2시 - 오후 10시", Tier::Body),
            TextLine::centered("올림픽공원 88잔디마당", Tier::Body),
            TextLine::centered("입장권: 88,000원", Tier::Small),
        ],
    }
}

fn year_end_party() -> PosterDoc {
    PosterDoc {
        style: StyleSheet {
            canvas: Canvas::new(800, 600),
            background: WHITE,
            fonts: fonts_for(&[(Tier::Body, 40.0)]),
            text_color: BLACK,
            accent_color: CRIMSON,
            line_pitch: 60.0,
            tier_pitch: BTreeMap::new(),
            start_offset: 50.0,
            left_margin: 50.0,
            highlight: HighlightRule::default(),
            decorations: vec![],
        },
        lines: vec![
            TextLine::left("연말 송년회 안내", Tier::Body),
            TextLine::left("일시: 12월 30일 오후 6시", Tier::Body),
            TextLine::left("장소: 강남 뷔페 레스토랑", Tier::Body),
            TextLine::left("회비: 30,000원", Tier::Body),
            TextLine::left("많은 참석 바랍니다!", Tier::Body),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_validates() {
        for s in all() {
            s.doc.validate().unwrap_or_else(|e| {
                panic!("scenario '{}' failed validation: {e}", s.name);
            });
        }
    }

    #[test]
    fn names_and_files_are_unique() {
        let scenarios = all();
        for (i, a) in scenarios.iter().enumerate() {
            for b in &scenarios[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.file_name, b.file_name);
            }
            assert!(a.file_name.ends_with(".png"));
        }
    }

    #[test]
    fn find_matches_by_name() {
        assert!(find("meeting").is_some());
        assert!(find("concert").is_some());
        assert!(find("banquet").is_none());
    }

    #[test]
    fn festival_line_box_targets_the_location_line() {
        let doc = festival();
        let target = doc
            .style
            .decorations
            .iter()
            .find_map(|d| match d {
                Decoration::LineBox { line, .. } => Some(*line),
                _ => None,
            })
            .unwrap();
        assert!(doc.lines[target].text.contains("올림픽공원"));
    }
}
