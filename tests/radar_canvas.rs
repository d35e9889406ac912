use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::widgets::{Block, Borders};

use season_radar::dataset;
use season_radar::radar::{self, AxisSpec};
use season_radar::radar_canvas::RadarCanvas;

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn draws_title_and_legend() {
    let csv = "player_name,cat.a,cat.b,cat.c,cat.d\nAna,80,40,,60\nBen,20,90,50,10\n";
    let table = dataset::parse_table(csv.as_bytes(), "inline").expect("valid csv");
    let axes: Vec<AxisSpec> = ["cat.a", "cat.b", "cat.c", "cat.d"]
        .into_iter()
        .map(|k| AxisSpec::new(k, k))
        .collect();
    let chart = radar::render(&["Ana", "Ben"], &axes, "Category Scores", &table).expect("chart");

    let mut terminal = Terminal::new(TestBackend::new(80, 30)).expect("test terminal");
    terminal
        .draw(|f| {
            let widget = RadarCanvas::new(&chart).block(
                Block::default()
                    .title(chart.title.clone())
                    .borders(Borders::ALL),
            );
            f.render_widget(widget, f.size());
        })
        .expect("draw");

    let text = screen_text(&terminal);
    assert!(text.contains("Category Scores"));
    assert!(text.contains("■ Ana"));
    assert!(text.contains("■ Ben"));
    assert!(text.contains("cat.a"));
}

#[test]
fn tiny_area_draws_nothing_but_the_block() {
    let csv = "player_name,cat.a,cat.b,cat.c\nAna,80,40,60\n";
    let table = dataset::parse_table(csv.as_bytes(), "inline").expect("valid csv");
    let axes: Vec<AxisSpec> = ["cat.a", "cat.b", "cat.c"]
        .into_iter()
        .map(|k| AxisSpec::new(k, k))
        .collect();
    let chart = radar::render(&["Ana"], &axes, "Scores", &table).expect("chart");

    let mut terminal = Terminal::new(TestBackend::new(6, 4)).expect("test terminal");
    terminal
        .draw(|f| f.render_widget(RadarCanvas::new(&chart).fill(false), f.size()))
        .expect("draw");
    assert!(!screen_text(&terminal).contains("Ana"));
}
