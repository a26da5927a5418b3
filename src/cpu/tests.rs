// This code is licensed under MIT license (see LICENSE for details)

//! Unit tests for [super::CPU]
//!
//! These call the opcode handlers directly and check their effect on machine
//! state. General test format:
//! 1. Prepare to do the thing
//! 2. Do the thing
//! 3. Compare the result to the expected result

use super::*;
use rand::random;


fn setup_environment() -> CPU {
    let mut cpu = CPU::default();
    // cls; jmp 0x202
    cpu.load_program_bytes(b"\x00\xe0\x12\x02")
        .expect("4 bytes fit in program space");
    cpu
}

mod sys {
    use super::*;
    /// 00e0: Clears the screen memory to 0
    #[test]
    fn clear_screen() {
        let mut cpu = setup_environment();
        cpu.screen.blit(4, 4, &[0xff, 0xff]);
        cpu.flags.draw = false;

        cpu.clear_screen();

        assert!(cpu.screen.as_bytes().iter().all(|&byte| byte == 0));
        assert!(cpu.flags.draw);
    }

    /// 00ee: Returns from subroutine
    #[test]
    fn ret() {
        let test_addr = random::<u16>() & 0x7ff;
        let mut cpu = setup_environment();
        // Place the address on the stack
        cpu.stack.push(test_addr);

        cpu.ret().unwrap();

        // Verify the current address is the address from the stack
        assert_eq!(test_addr, cpu.pc);
        assert!(cpu.stack.is_empty());
    }

    /// 00ee with an empty stack is a fault, not a wrap
    #[test]
    fn ret_underflow() {
        let mut cpu = setup_environment();
        let fault = cpu.ret().unwrap_err();
        assert!(matches!(fault, Error::StackUnderflow { sp: 0, .. }));
    }
}

/// Tests control-flow instructions
///
/// Basically anything that touches the program counter
mod cf {
    use super::*;

    /// 1aaa: Sets the program counter to an absolute address
    #[test]
    fn jump() {
        let mut cpu = setup_environment();
        for addr in 0x000..0xffe {
            cpu.jump(addr);
            assert_eq!(addr, cpu.pc);
        }
    }

    /// 2aaa: Pushes the return address onto the stack, then jumps to a
    #[test]
    fn call() {
        let test_addr = random::<u16>() & 0xfff;
        let mut cpu = setup_environment();
        // Save the address of the instruction following the call
        let next_addr = cpu.pc;

        cpu.call(test_addr).unwrap();

        // Verify the current address is the called address
        assert_eq!(test_addr, cpu.pc);
        // Verify the return address was stored on the stack
        assert_eq!(Some(next_addr), cpu.stack.pop());
    }

    /// A 17th nested call faults with the stack untouched
    #[test]
    fn call_overflow() {
        let mut cpu = setup_environment();
        for _ in 0..16 {
            cpu.call(0x300).unwrap();
        }
        let fault = cpu.call(0x300).unwrap_err();
        assert!(matches!(fault, Error::StackOverflow { sp: 16, .. }));
        assert_eq!(16, cpu.stack.len());
    }

    /// 3xbb: Skips the next instruction if register X == b
    #[test]
    fn skip_equals_immediate() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 4) as u8, random::<u16>() & 0x7fe);
            for x in 0..=0xf {
                cpu.pc = addr;
                cpu.v[x] = a;

                cpu.skip_equals_immediate(x, b);

                assert_eq!(cpu.pc, addr.wrapping_add(if a == b { 2 } else { 0 }));
            }
        }
    }

    /// 4xbb: Skips the next instruction if register X != b
    #[test]
    fn skip_not_equals_immediate() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 4) as u8, random::<u16>() & 0x7fe);
            for x in 0..=0xf {
                cpu.pc = addr;
                cpu.v[x] = a;

                cpu.skip_not_equals_immediate(x, b);

                assert_eq!(cpu.pc, addr.wrapping_add(if a != b { 2 } else { 0 }));
            }
        }
    }

    /// 5xy0: Skips the next instruction if register X == register Y
    #[test]
    fn skip_equals() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 4) as u8, random::<u16>() & 0x7fe);
            for reg in 0..=0xff {
                let (x, y) = (reg & 0xf, reg >> 4);
                if x == y {
                    continue;
                }
                cpu.pc = addr;
                (cpu.v[x], cpu.v[y]) = (a, b);

                cpu.skip_equals(x, y);

                assert_eq!(cpu.pc, addr.wrapping_add(if a == b { 2 } else { 0 }));
            }
        }
    }

    /// 9xy0: Skips the next instruction if register X != register Y
    #[test]
    fn skip_not_equals() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 4) as u8, random::<u16>() & 0x7fe);
            for reg in 0..=0xff {
                let (x, y) = (reg & 0xf, reg >> 4);
                if x == y {
                    continue;
                }
                cpu.pc = addr;
                (cpu.v[x], cpu.v[y]) = (a, b);

                cpu.skip_not_equals(x, y);

                assert_eq!(cpu.pc, addr.wrapping_add(if a != b { 2 } else { 0 }));
            }
        }
    }

    /// Badr: Jump to &adr + v0, masked to 12 bits
    #[test]
    fn jump_indexed() {
        let mut cpu = setup_environment();
        for addr in 0..0x1000u16 {
            for v0 in 0..=0xff {
                cpu.v[0] = v0;

                cpu.jump_indexed(addr);

                assert_eq!(cpu.pc, addr.wrapping_add(v0.into()) & 0xfff);
            }
        }
    }
}

mod math {
    use super::*;
    /// 6xbb: Loads immediate byte b into register vX
    #[test]
    fn load_immediate() {
        let mut cpu = setup_environment();
        for test_register in 0x0..=0xf {
            for test_byte in 0x0..=0xff {
                cpu.load_immediate(test_register, test_byte);
                assert_eq!(cpu.v[test_register], test_byte)
            }
        }
    }

    /// 7xbb: Adds immediate byte b to register vX, wrapping, vF untouched
    #[test]
    fn add_immediate() {
        let mut cpu = setup_environment();
        for test_register in 0x0..=0xe {
            cpu.v[0xf] = 0xc5; // sentinel
            let mut sum = 0u8;
            for test_byte in 0x0..=0xff {
                sum = sum.wrapping_add(test_byte);

                cpu.add_immediate(test_register, test_byte);

                assert_eq!(cpu.v[test_register], sum);
                assert_eq!(cpu.v[0xf], 0xc5);
            }
        }
    }

    /// 8xy0: Loads the value of y into x
    #[test]
    fn load() {
        let mut cpu = setup_environment();
        for test_value in 1..=0xff {
            for reg in 0..=0xff {
                let (x, y) = (reg & 0xf, reg >> 4);
                if x == y {
                    continue;
                }
                cpu.v[y] = test_value;
                cpu.v[x] = 0;

                cpu.load(x, y);

                assert_eq!(cpu.v[x], test_value);
                assert_eq!(cpu.v[y], test_value);
            }
        }
    }

    /// 8xy1: Bitwise or, no flag side effect
    #[test]
    fn or() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b) = (word as u8, (word >> 4) as u8);
            let (x, y) = (0x2, 0x5);
            cpu.v[0xf] = 0xc5; // sentinel
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.or(x, y);

            assert_eq!(cpu.v[x], a | b);
            assert_eq!(cpu.v[0xf], 0xc5);
        }
    }

    /// 8xy2: Bitwise and, no flag side effect
    #[test]
    fn and() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b) = (word as u8, (word >> 4) as u8);
            let (x, y) = (0x2, 0x5);
            cpu.v[0xf] = 0xc5; // sentinel
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.and(x, y);

            assert_eq!(cpu.v[x], a & b);
            assert_eq!(cpu.v[0xf], 0xc5);
        }
    }

    /// 8xy3: Bitwise xor, no flag side effect
    #[test]
    fn xor() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b) = (word as u8, (word >> 4) as u8);
            let (x, y) = (0x2, 0x5);
            cpu.v[0xf] = 0xc5; // sentinel
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.xor(x, y);

            assert_eq!(cpu.v[x], a ^ b);
            assert_eq!(cpu.v[0xf], 0xc5);
        }
    }

    /// 8xy4: Addition with vF = carry out of the 9-bit sum
    #[test]
    fn add() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b) = (word as u8, (word >> 4) as u8);
            let (x, y) = (0x2, 0x5);
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.add(x, y);

            let sum = a as u16 + b as u16;
            assert_eq!(cpu.v[x], sum as u8);
            assert_eq!(cpu.v[0xf], (sum > 0xff) as u8);
        }
    }

    /// 8xy5: Subtraction with vF = 1 when no borrow
    #[test]
    fn sub() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b) = (word as u8, (word >> 4) as u8);
            let (x, y) = (0x2, 0x5);
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.sub(x, y);

            assert_eq!(cpu.v[x], a.wrapping_sub(b));
            assert_eq!(cpu.v[0xf], (a >= b) as u8);
        }
    }

    /// 8xy7: Reverse subtraction with vF = 1 when no borrow
    #[test]
    fn backwards_sub() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b) = (word as u8, (word >> 4) as u8);
            let (x, y) = (0x2, 0x5);
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.backwards_sub(x, y);

            assert_eq!(cpu.v[x], b.wrapping_sub(a));
            assert_eq!(cpu.v[0xf], (b >= a) as u8);
        }
    }

    /// 8xy6: vF is the bit shifted out, stored after the result
    #[test]
    fn shift_right() {
        let mut cpu = setup_environment();
        for value in 0..=0xff {
            cpu.v[0x2] = value;

            cpu.shift_right(0x2);

            assert_eq!(cpu.v[0x2], value >> 1);
            assert_eq!(cpu.v[0xf], value & 1);
        }
    }

    /// 8xyE: vF is the bit shifted out, stored after the result
    #[test]
    fn shift_left() {
        let mut cpu = setup_environment();
        for value in 0..=0xff {
            cpu.v[0x2] = value;

            cpu.shift_left(0x2);

            assert_eq!(cpu.v[0x2], value << 1);
            assert_eq!(cpu.v[0xf], value >> 7);
        }
    }

    /// An ALU op targeting vF keeps the flag, not the result
    #[test]
    fn flag_register_keeps_flag() {
        let mut cpu = setup_environment();
        (cpu.v[0xf], cpu.v[0x1]) = (0xff, 0x02);

        cpu.add(0xf, 0x1);

        assert_eq!(cpu.v[0xf], 1);
    }

    /// Cxbb: random byte masked with b
    #[test]
    fn rand() {
        let mut cpu = setup_environment();
        for _ in 0..100 {
            cpu.rand(0x3, 0x0f);
            assert_eq!(cpu.v[0x3] & 0xf0, 0);
        }
    }
}

mod draw {
    use super::*;

    /// Dxyn blits the sprite at I, raises the draw signal, reports no
    /// collision on a blank screen
    #[test]
    fn draw_to_blank_screen() {
        let mut cpu = setup_environment();
        cpu.i = 0x300;
        cpu.mem.write(0x300, 0xff);
        (cpu.v[0], cpu.v[1]) = (8, 4);

        cpu.draw(0, 1, 1).unwrap();

        assert_eq!(cpu.v[0xf], 0);
        assert!(cpu.flags.draw);
        for x in 8..16 {
            assert!(cpu.screen.get(x, 4));
        }
    }

    /// Drawing the same sprite twice erases it and reports a collision
    #[test]
    fn double_draw_restores_pixels() {
        let mut cpu = setup_environment();
        cpu.i = 0x300;
        for (offset, byte) in [0xf0u8, 0x90, 0x90, 0x90, 0xf0].iter().enumerate() {
            cpu.mem.write(0x300 + offset as u16, *byte);
        }
        (cpu.v[0], cpu.v[1]) = (12, 7);

        cpu.draw(0, 1, 5).unwrap();
        assert_eq!(cpu.v[0xf], 0);

        cpu.draw(0, 1, 5).unwrap();
        assert_eq!(cpu.v[0xf], 1);
        assert!(cpu.screen.as_bytes().iter().all(|&byte| byte == 0));
    }

    /// Sprites are clipped at the screen edge, not wrapped
    #[test]
    fn clipped_at_edges() {
        let mut cpu = setup_environment();
        cpu.i = 0x300;
        cpu.mem.write(0x300, 0xff);
        cpu.mem.write(0x301, 0xff);
        (cpu.v[0], cpu.v[1]) = (60, 31);

        cpu.draw(0, 1, 2).unwrap();

        // only the 4 in-bounds pixels of the first row land
        for x in 60..64 {
            assert!(cpu.screen.get(x, 31));
        }
        // nothing wrapped to column 0 or row 0
        for x in 0..4 {
            assert!(!cpu.screen.get(x, 31));
            assert!(!cpu.screen.get(x, 0));
        }
    }

    /// Sprite data past the end of memory is a fault
    #[test]
    fn sprite_read_out_of_bounds() {
        let mut cpu = setup_environment();
        cpu.i = 0xffe;
        let fault = cpu.draw(0, 1, 4).unwrap_err();
        assert!(matches!(
            fault,
            Error::OutOfBoundsAccess { addr: 0xffe, len: 4, .. }
        ));
    }
}

mod io {
    use super::*;

    /// Fx07: vX = DT
    #[test]
    fn load_delay_timer() {
        let mut cpu = setup_environment();
        cpu.delay = 0x42;
        cpu.load_delay_timer(0x3);
        assert_eq!(cpu.v[0x3], 0x42);
    }

    /// Fx15 / Fx18: timers = vX
    #[test]
    fn store_timers() {
        let mut cpu = setup_environment();
        cpu.v[0x3] = 0x42;
        cpu.store_delay_timer(0x3);
        cpu.store_sound_timer(0x3);
        assert_eq!(cpu.delay, 0x42);
        assert_eq!(cpu.sound, 0x42);
    }

    /// Fx1e: I += vX, masked to 12 bits
    #[test]
    fn add_i() {
        let mut cpu = setup_environment();
        (cpu.i, cpu.v[0x3]) = (0xffe, 0x04);
        cpu.add_i(0x3);
        assert_eq!(cpu.i, 0x002);
    }

    /// Fx29: I points at the glyph for the low nibble of vX
    #[test]
    fn load_sprite() {
        let mut cpu = setup_environment();
        for digit in 0..=0xff {
            cpu.v[0x3] = digit;
            cpu.load_sprite(0x3);
            assert_eq!(cpu.i, 0x50 + 5 * (digit as u16 & 0xf));
        }
    }

    /// Fx33: hundreds, tens, ones at I
    #[test]
    fn bcd_convert() {
        let mut cpu = setup_environment();
        cpu.i = 0x400;
        cpu.v[0x3] = 159;

        cpu.bcd_convert(0x3).unwrap();

        assert_eq!(cpu.mem.read(0x400), 1);
        assert_eq!(cpu.mem.read(0x401), 5);
        assert_eq!(cpu.mem.read(0x402), 9);
    }

    /// Fx55 then Fx65 round-trips the registers; I is unchanged
    #[test]
    fn dma_roundtrip() {
        let mut cpu = setup_environment();
        cpu.i = 0x400;
        for (reg, value) in cpu.v.iter_mut().enumerate() {
            *value = reg as u8 ^ 0xa5;
        }
        let saved = cpu.v;

        cpu.store_dma(0xf).unwrap();
        assert_eq!(cpu.i, 0x400);
        cpu.v = [0; 16];
        cpu.load_dma(0xf).unwrap();

        assert_eq!(cpu.v, saved);
        assert_eq!(cpu.i, 0x400);
    }

    /// Fx55 past the end of memory is a fault and writes nothing
    #[test]
    fn dma_out_of_bounds() {
        let mut cpu = setup_environment();
        cpu.i = 0xff8;
        let fault = cpu.store_dma(0xf).unwrap_err();
        assert!(matches!(
            fault,
            Error::OutOfBoundsAccess { addr: 0xff8, len: 16, .. }
        ));
    }
}

mod keys {
    use super::*;

    /// Ex9e / Exa1 read key state directly and never touch the latch
    #[test]
    fn skip_key() {
        let mut cpu = setup_environment();
        cpu.v[0x3] = 0x7;
        cpu.pc = 0x400;

        cpu.skip_key_equals(0x3);
        assert_eq!(cpu.pc, 0x400);
        cpu.skip_key_not_equals(0x3);
        assert_eq!(cpu.pc, 0x402);

        cpu.press(0x7).unwrap();
        cpu.pc = 0x400;
        cpu.skip_key_equals(0x3);
        assert_eq!(cpu.pc, 0x402);
        cpu.skip_key_not_equals(0x3);
        assert_eq!(cpu.pc, 0x402);
        assert_eq!(cpu.flags.wait, Wait::Running);
    }

    /// Fx0a rewinds onto itself and latches AwaitingKey
    #[test]
    fn wait_for_key_latches() {
        let mut cpu = setup_environment();
        cpu.pc = 0x402; // as if the fetch at 0x400 already advanced
        cpu.wait_for_key(0x3);
        assert_eq!(cpu.pc, 0x400);
        assert_eq!(cpu.flags.wait, Wait::AwaitingKey { x: 0x3 });
    }

    /// While latched, step() does not fetch; the first key down resumes
    #[test]
    fn wait_for_key_resumes() {
        let mut cpu = setup_environment();
        // waitk v3
        cpu.load_program_bytes(b"\xf3\x0a").unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.pc, 0x200);

        for _ in 0..100 {
            cpu.step().unwrap();
        }
        assert_eq!(cpu.pc, 0x200);
        assert_eq!(cpu.cycle(), 1);

        cpu.press(0xb).unwrap();
        cpu.step().unwrap();

        assert_eq!(cpu.v[0x3], 0xb);
        assert_eq!(cpu.pc, 0x202);
        assert_eq!(cpu.flags.wait, Wait::Running);
    }
}

mod timer {
    use super::*;

    /// tick() decrements both timers, saturating at zero
    #[test]
    fn tick_saturates() {
        let mut cpu = setup_environment();
        (cpu.delay, cpu.sound) = (2, 1);
        for _ in 0..5 {
            cpu.tick();
        }
        assert_eq!(cpu.delay, 0);
        assert_eq!(cpu.sound, 0);
    }

    /// step() never touches the timers
    #[test]
    fn step_leaves_timers_alone() {
        let mut cpu = setup_environment();
        (cpu.delay, cpu.sound) = (0xff, 0xff);
        cpu.multistep(100).unwrap();
        assert_eq!(cpu.delay, 0xff);
        assert_eq!(cpu.sound, 0xff);
    }
}
