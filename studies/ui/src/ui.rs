use std::{ rc::Rc, sync::mpsc::Sender, time::Duration };

use color_eyre::Result;
use crossterm::event::{ self, Event, KeyCode, KeyEventKind };
use ratatui::{
    buffer::Buffer,
    layout::{ Alignment, Constraint, Direction, Layout, Rect },
    prelude::Stylize,
    style::{ palette::tailwind, Color, Modifier, Style },
    symbols,
    text::{ Line, Span, Text },
    widgets::{
        block::Title,
        Axis,
        Block,
        Borders,
        Cell,
        Chart,
        Dataset,
        GraphType,
        LineGauge,
        Padding,
        Paragraph,
        Row,
        Table,
        Widget,
    },
    DefaultTerminal,
};

use crate::state::{ NetworkView, StateMutex, StatePerceptron };

const CUSTOM_LABEL_COLOR: Color = tailwind::SLATE.c200;
const WEIGHT_BARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Operator input forwarded to the simulation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    EditLayer(usize),
    Inspect(usize),
    PressScreen,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub state_perceptron: StateMutex,
    pub controls: Sender<Control>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    #[default]
    Running,
    Quitting,
}

impl App {
    pub fn new(state_perceptron: StateMutex, controls: Sender<Control>) -> App {
        App { state: AppState::default(), state_perceptron, controls }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while self.state != AppState::Quitting {
            terminal.draw(|frame| frame.render_widget(&self, frame.area()))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn handle_events(&mut self) -> Result<()> {
        let timeout = Duration::from_secs_f32(1.0 / 20.0);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(control) = control_for(key.code) {
                        self.dispatch(control);
                    }
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, control: Control) {
        // the simulation thread is gone once it has hung up: nothing left to drive
        if self.controls.send(control).is_err() || control == Control::Quit {
            self.quit();
        }
    }

    fn quit(&mut self) {
        self.state = AppState::Quitting;
    }
}

/// Keys `1`-`4` edit hidden layers, `a`-`e` inspect connection layers.
pub fn control_for(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Control::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Control::PressScreen),
        KeyCode::Char(c @ '1'..='4') => Some(Control::EditLayer((c as usize) - ('1' as usize))),
        KeyCode::Char(c @ 'a'..='e') => Some(Control::Inspect((c as usize) - ('a' as usize))),
        _ => None,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = match self.state_perceptron.lock() {
            Ok(state) => state.clone(),
            Err(_) => {
                return;
            }
        };

        let body = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Max(1), Constraint::Fill(2), Constraint::Max(1)].as_ref())
            .split(area);

        let container = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(9), Constraint::Fill(1)].as_ref())
            .split(body[1]);

        let section_top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(44)].as_ref())
            .split(container[1]);

        let section_bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
            .split(container[2]);

        render_header(&state, body[0], buf);
        render_footer(body[2], buf);
        render_progress(&state, container[0], buf);
        render_network(&state.network, section_top[0], buf);
        render_readouts(&state, section_top[1], buf);
        render_bottom(&state, section_bottom, buf);
    }
}

fn render_header(state: &StatePerceptron, area: Rect, buf: &mut Buffer) {
    Paragraph::new(format!("{} - {}", state.title, state.stage))
        .bold()
        .alignment(Alignment::Left)
        .fg(CUSTOM_LABEL_COLOR)
        .render(area, buf);
}

fn render_footer(area: Rect, buf: &mut Buffer) {
    Paragraph::new("1-4 resize layer | a-e inspect connections | SPACE train/reset | q quit")
        .alignment(Alignment::Center)
        .fg(CUSTOM_LABEL_COLOR)
        .bold()
        .render(area, buf);
}

fn calculate_ratio(current: u64, max: u64) -> f64 {
    if max == 0 { 0.0 } else { ((current as f64) / (max as f64)).clamp(0.0, 1.0) }
}

fn render_progress(state: &StatePerceptron, area: Rect, buf: &mut Buffer) {
    LineGauge::default()
        .block(Block::default().borders(Borders::ALL).title("Training"))
        .filled_style(Style::default().fg(Color::Cyan))
        .ratio(calculate_ratio(state.progress.elapsed, state.progress.target))
        .render(area, buf);
}

/// One bar glyph per connection, brighter for heavier weights.
pub fn weight_bars(weights: &[f32]) -> String {
    weights
        .iter()
        .map(|w| {
            let level = (w.clamp(0.0, 1.0) * ((WEIGHT_BARS.len() - 1) as f32)).round() as usize;
            WEIGHT_BARS[level]
        })
        .collect()
}

fn layer_label(network: &NetworkView, layer: usize) -> String {
    let side = |index: usize| -> String {
        if index == 0 {
            format!("in {}", network.inputs)
        } else if index > network.hidden_layers.len() {
            format!("out {}", network.outputs)
        } else {
            format!("h{} {}", index, network.hidden_layers[index - 1])
        }
    };
    format!("{} -> {}", side(layer), side(layer + 1))
}

fn render_network(network: &NetworkView, area: Rect, buf: &mut Buffer) {
    let rows = network.connections
        .iter()
        .enumerate()
        .map(|(layer, weights)| {
            let mut bars = vec![Span::raw(weight_bars(weights))];
            if let Some((touched_layer, index)) = network.touched {
                if touched_layer == layer && index < weights.len() {
                    let text = weight_bars(weights);
                    let (before, rest) = text.split_at(
                        text.char_indices().nth(index).map_or(text.len(), |(i, _)| i)
                    );
                    let mut chars = rest.chars();
                    let hit = chars.next().map(String::from).unwrap_or_default();
                    bars = vec![
                        Span::raw(before.to_string()),
                        Span::styled(hit, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                        Span::raw(chars.collect::<String>())
                    ];
                }
            }
            let label_style = if network.holding == Some(layer) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(
                vec![
                    Cell::from(format!("{}", (b'a' + (layer as u8)) as char)),
                    Cell::from(layer_label(network, layer)).style(label_style),
                    Cell::from(Line::from(bars))
                ]
            ).height(1)
        });

    let header = Row::new(vec![Cell::from("Key"), Cell::from("Layer"), Cell::from("Weights")])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .height(1);

    Table::new(rows, [Constraint::Length(4), Constraint::Length(14), Constraint::Fill(1)])
        .header(header)
        .block(title_block("Network"))
        .render(area, buf);
}

fn render_readouts(state: &StatePerceptron, area: Rect, buf: &mut Buffer) {
    let readouts = &state.readouts;
    let rows = [
        ("Accuracy", &readouts.current_accuracy, &readouts.required_accuracy),
        ("Time", &readouts.current_time, &readouts.max_time),
        ("Rate / Delay", &readouts.convergence_rate, &readouts.connection_delay),
    ].map(|(label, left, right)| {
        Row::new(
            vec![Cell::from(label), Cell::from(left.clone()), Cell::from(right.clone())]
        ).height(1)
    });

    let header = Row::new(vec![Cell::from(""), Cell::from("Current"), Cell::from("Required")])
        .style(Style::default())
        .height(1);

    Table::new(rows, [Constraint::Length(13), Constraint::Length(12), Constraint::Fill(1)])
        .header(header)
        .block(title_block("Screen"))
        .render(area, buf);
}

fn render_bottom(state: &StatePerceptron, area: Rc<[Rect]>, buf: &mut Buffer) {
    render_accuracy_chart(state, area[0], buf);
    render_table_history(state, area[1], buf);
}

fn render_accuracy_chart(state: &StatePerceptron, area: Rect, buf: &mut Buffer) {
    let max_x = state.accuracy_curve
        .last()
        .map_or(1.0, |(x, _)| *x)
        .max((state.progress.target as f64) / 1000.0)
        .max(1.0);
    let max_y = state.accuracy_curve
        .iter()
        .map(|(_, y)| *y)
        .fold(1.0, f64::max);

    let accuracy_dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(Color::Green))
        .graph_type(GraphType::Line)
        .data(&state.accuracy_curve);

    Chart::new(vec![accuracy_dataset])
        .block(Block::default().borders(Borders::ALL).title("Accuracy"))
        .x_axis(
            Axis::default()
                .title("Seconds")
                .bounds([0.0, max_x])
                .labels(vec![Span::raw("0"), Span::raw(format!("{:.1}", max_x))])
                .style(Style::default().fg(Color::Gray))
        )
        .y_axis(
            Axis::default()
                .title("Accuracy")
                .bounds([0.0, max_y])
                .labels(vec![Span::raw("0"), Span::raw(format!("{:.0}", max_y))])
                .style(Style::default().fg(Color::Gray))
        )
        .render(area, buf);
}

fn render_table_history(state: &StatePerceptron, area: Rect, buf: &mut Buffer) {
    let rows = state.history
        .iter()
        .rev()
        .map(|(info, value)| {
            Row::new(vec![Cell::from(info.clone()), Cell::from(Text::raw(value.clone()))]).height(1)
        });

    let header = Row::new(vec![Cell::from("Info"), Cell::from("Value")])
        .style(Style::default())
        .height(1);

    Table::new(rows, [Constraint::Percentage(60), Constraint::Percentage(40)])
        .header(header)
        .block(title_block("History"))
        .render(area, buf);
}

fn title_block(title: &str) -> Block {
    let title = Title::from(title).alignment(Alignment::Center);
    Block::new()
        .padding(Padding::horizontal(1))
        .title(title)
        .borders(Borders::ALL)
        .fg(CUSTOM_LABEL_COLOR)
}
