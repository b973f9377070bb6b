use std::time::Duration;

use crate::random::RandomSource;

const CONFETTI_SYMBOLS: [char; 6] = ['*', '✦', '●', '■', '▲', '✿'];
/// Palette size; the renderer maps indices to colours.
pub const CONFETTI_COLORS: usize = 5;
const CONFETTI_COUNT: usize = 40;
const GRAVITY: f64 = 15.0;

/// Particle for celebration animation
#[derive(Debug, Clone)]
pub struct CelebrationParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// Letters of the cheer word fly to a fixed slot and stay there.
    pub is_text: bool,
    pub target_x: f64,
    pub target_y: f64,
}

impl CelebrationParticle {
    fn confetti(x: f64, y: f64, rng: &mut dyn RandomSource) -> Self {
        Self {
            x,
            y,
            vel_x: rng.range_f64(-3.0, 3.0),
            vel_y: rng.range_f64(-4.0, -1.0),
            symbol: CONFETTI_SYMBOLS[rng.index(CONFETTI_SYMBOLS.len())],
            color_index: rng.index(CONFETTI_COLORS),
            age: 0.0,
            max_age: rng.range_f64(2.0, 4.0),
            is_text: false,
            target_x: x,
            target_y: y,
        }
    }

    fn letter(
        from: (f64, f64),
        target: (f64, f64),
        symbol: char,
        rng: &mut dyn RandomSource,
    ) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: target.0 - from.0,
            vel_y: target.1 - from.1,
            symbol,
            color_index: rng.index(CONFETTI_COLORS),
            age: 0.0,
            max_age: rng.range_f64(4.0, 5.5),
            is_text: true,
            target_x: target.0,
            target_y: target.1,
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        if self.is_text {
            let dist_to_target = (self.target_x - self.x).hypot(self.target_y - self.y);
            if dist_to_target > 1.0 {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_x *= 0.95;
                self.vel_y *= 0.95;
            } else {
                self.x = self.target_x;
                self.y = self.target_y;
                self.vel_x = 0.0;
                self.vel_y = 0.0;
            }
        } else {
            self.x += self.vel_x * dt;
            self.y += self.vel_y * dt;
            self.vel_y += GRAVITY * dt;
        }

        self.age += dt;
        self.age < self.max_age
    }
}

/// Confetti shown while the reward cue plays.
#[derive(Debug)]
pub struct CelebrationAnimation {
    pub particles: Vec<CelebrationParticle>,
    pub elapsed: Duration,
    pub duration: Duration,
    pub is_active: bool,
    pub width: f64,
    pub height: f64,
}

impl CelebrationAnimation {
    pub fn new(duration: Duration) -> Self {
        Self {
            particles: Vec::new(),
            elapsed: Duration::ZERO,
            duration,
            is_active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    /// Spells `word` in the middle of the area and scatters confetti around it.
    pub fn start(&mut self, word: &str, width: u16, height: u16, rng: &mut dyn RandomSource) {
        self.particles.clear();
        self.elapsed = Duration::ZERO;
        self.is_active = true;
        self.width = f64::from(width);
        self.height = f64::from(height);

        let center_x = self.width / 2.0;
        let center_y = self.height / 2.0;

        let spacing = 2.0;
        let letters: Vec<char> = word.chars().collect();
        let word_width = (letters.len().saturating_sub(1)) as f64 * spacing;
        let start_x = center_x - word_width / 2.0;
        for (i, ch) in letters.into_iter().enumerate() {
            if ch == ' ' {
                continue;
            }
            let target = (start_x + i as f64 * spacing, center_y - 2.0);
            let from = (
                center_x + rng.range_f64(-10.0, 10.0),
                center_y + rng.range_f64(-5.0, 5.0),
            );
            self.particles
                .push(CelebrationParticle::letter(from, target, ch, rng));
        }

        for _ in 0..CONFETTI_COUNT {
            let x = center_x + rng.range_f64(-15.0, 15.0);
            let y = center_y + rng.range_f64(-8.0, 8.0);
            self.particles.push(CelebrationParticle::confetti(x, y, rng));
        }
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.particles.clear();
    }

    pub fn update(&mut self, dt: Duration) {
        if !self.is_active {
            return;
        }

        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.stop();
            return;
        }

        let step = dt.as_secs_f64();
        let (width, height) = (self.width, self.height);
        self.particles.retain_mut(|particle| {
            let still_alive = particle.update(step);
            if particle.is_text {
                return still_alive;
            }
            let buffer = 5.0;
            let off_screen =
                particle.y > height + buffer || particle.x < -buffer || particle.x > width + buffer;
            still_alive && !off_screen
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TICK: Duration = Duration::from_millis(100);

    fn started(word: &str, width: u16, height: u16) -> CelebrationAnimation {
        let mut rng = StdRng::seed_from_u64(21);
        let mut celebration = CelebrationAnimation::new(Duration::from_secs(5));
        celebration.start(word, width, height, &mut rng);
        celebration
    }

    #[test]
    fn confetti_falls_under_gravity() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut particle = CelebrationParticle::confetti(10.0, 10.0, &mut rng);
        let initial_vel_y = particle.vel_y;

        assert!(particle.update(0.1));
        assert!(particle.vel_y > initial_vel_y);
    }

    #[test]
    fn letters_settle_on_their_slot() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut letter = CelebrationParticle::letter((0.0, 0.0), (10.0, 5.0), 'B', &mut rng);
        for _ in 0..10 {
            letter.update(0.1);
        }
        let distance = (letter.target_x - letter.x).hypot(letter.target_y - letter.y);
        assert!(distance < 5.0);
    }

    #[test]
    fn start_spells_the_word_without_spaces() {
        let celebration = started("Bien joué", 80, 24);
        assert!(celebration.is_active);
        let letters: String = celebration
            .particles
            .iter()
            .filter(|particle| particle.is_text)
            .map(|particle| particle.symbol)
            .collect();
        assert_eq!(letters, "Bienjoué");
        assert_eq!(
            celebration.particles.iter().filter(|p| !p.is_text).count(),
            CONFETTI_COUNT
        );
    }

    #[test]
    fn ends_after_its_duration() {
        let mut celebration = started("Bravo", 80, 24);
        for _ in 0..49 {
            celebration.update(TICK);
        }
        assert!(celebration.is_active);
        celebration.update(TICK);
        assert!(!celebration.is_active);
        assert!(celebration.particles.is_empty());
    }

    #[test]
    fn off_screen_confetti_is_dropped() {
        let mut celebration = started("Bravo", 20, 10);
        let mut rng = StdRng::seed_from_u64(3);
        celebration
            .particles
            .push(CelebrationParticle::confetti(100.0, 100.0, &mut rng));

        for _ in 0..10 {
            celebration.update(TICK);
        }
        for particle in celebration.particles.iter().filter(|p| !p.is_text) {
            assert!(particle.y <= 15.0 && particle.x >= -5.0 && particle.x <= 25.0);
        }
    }

    #[test]
    fn update_is_a_no_op_when_idle() {
        let mut celebration = CelebrationAnimation::new(Duration::from_secs(1));
        celebration.update(TICK);
        assert!(!celebration.is_active);
        assert_eq!(celebration.elapsed, Duration::ZERO);
    }
}
